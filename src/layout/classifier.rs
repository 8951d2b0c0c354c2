use crate::models::{ContentItem, RowLayout};

/// Decide the nesting shape of a finished row.
///
/// `main` is the component that filled a pattern's dominant role, if the
/// pattern has one. Works for any non-empty row, fallback rows included.
pub fn classify(components: &[ContentItem], main: Option<usize>) -> RowLayout {
    if let Some(quad) = nested_quad(components) {
        return quad;
    }

    match main {
        Some(main) if main < components.len() && components.len() >= 3 => RowLayout::MainStacked {
            main,
            stacked: (0..components.len()).filter(|&i| i != main).collect(),
        },
        _ => RowLayout::Horizontal,
    }
}

fn nested_quad(components: &[ContentItem]) -> Option<RowLayout> {
    if components.len() != 4 {
        return None;
    }
    let verticals: Vec<usize> = (0..components.len())
        .filter(|&i| components[i].is_vertical())
        .collect();
    if verticals.len() < 2 {
        return None;
    }

    // Highest effective rating wins, earliest on ties.
    let main = verticals.iter().copied().max_by(|&a, &b| {
        components[a]
            .effective_rating()
            .cmp(&components[b].effective_rating())
            .then(b.cmp(&a))
    })?;

    let mut rest: Vec<usize> = (0..components.len()).filter(|&i| i != main).collect();
    rest.sort_by_key(|&i| {
        (
            !components[i].is_vertical(),
            components[i].effective_rating(),
            i,
        )
    });

    let mut top = [rest[0], rest[1]];
    top.sort_unstable();
    Some(RowLayout::NestedQuad {
        main,
        top,
        bottom: rest[2],
    })
}
