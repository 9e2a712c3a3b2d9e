//! Ordered article sections.
//!
//! Invariant: after every operation `order` runs 0..n with no gaps and
//! matches the position in the list.

use serde::Deserialize;

use crate::errors::{HubError, Result};
use crate::models::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Sort by the client-supplied `order` (stable for ties) and renumber densely.
pub fn normalize(mut sections: Vec<Section>) -> Vec<Section> {
    sections.sort_by_key(|s| s.order);
    renumber(&mut sections);
    sections
}

fn renumber(sections: &mut [Section]) {
    for (idx, section) in sections.iter_mut().enumerate() {
        section.order = idx as i64;
    }
}

pub fn insert(sections: &mut Vec<Section>, index: usize, section: Section) -> Result<()> {
    if index > sections.len() {
        return Err(HubError::validation(format!(
            "Section index {} out of range (0..={})",
            index,
            sections.len()
        )));
    }
    sections.insert(index, section);
    renumber(sections);
    Ok(())
}

pub fn remove(sections: &mut Vec<Section>, index: usize) -> Result<Section> {
    if index >= sections.len() {
        return Err(HubError::validation(format!("Section index {} out of range", index)));
    }
    let removed = sections.remove(index);
    renumber(sections);
    Ok(removed)
}

/// Swap a section with its neighbour. Moving past either end is a no-op.
pub fn move_section(sections: &mut [Section], index: usize, direction: Direction) -> Result<()> {
    if index >= sections.len() {
        return Err(HubError::validation(format!("Section index {} out of range", index)));
    }
    let target = match direction {
        Direction::Up if index > 0 => index - 1,
        Direction::Down if index + 1 < sections.len() => index + 1,
        _ => return Ok(()),
    };
    sections.swap(index, target);
    renumber(sections);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(title: &str, order: i64) -> Section {
        Section {
            title: title.to_string(),
            order,
            ..Default::default()
        }
    }

    fn titles(sections: &[Section]) -> Vec<(&str, i64)> {
        sections.iter().map(|s| (s.title.as_str(), s.order)).collect()
    }

    #[test]
    fn normalize_closes_gaps_and_sorts() {
        let out = normalize(vec![section("c", 9), section("a", -1), section("b", 4)]);
        assert_eq!(titles(&out), vec![("a", 0), ("b", 1), ("c", 2)]);
    }

    #[test]
    fn move_up_swaps_with_previous() -> Result<()> {
        let mut s = vec![section("A", 0), section("B", 1)];
        move_section(&mut s, 1, Direction::Up)?;
        assert_eq!(titles(&s), vec![("B", 0), ("A", 1)]);
        Ok(())
    }

    #[test]
    fn move_past_edges_is_noop() -> Result<()> {
        let mut s = vec![section("A", 0), section("B", 1)];
        move_section(&mut s, 0, Direction::Up)?;
        move_section(&mut s, 1, Direction::Down)?;
        assert_eq!(titles(&s), vec![("A", 0), ("B", 1)]);
        Ok(())
    }

    #[test]
    fn insert_and_remove_keep_order_dense() -> Result<()> {
        let mut s = vec![section("A", 0), section("C", 1)];
        insert(&mut s, 1, section("B", 99))?;
        assert_eq!(titles(&s), vec![("A", 0), ("B", 1), ("C", 2)]);
        let removed = remove(&mut s, 0)?;
        assert_eq!(removed.title, "A");
        assert_eq!(titles(&s), vec![("B", 0), ("C", 1)]);
        Ok(())
    }

    #[test]
    fn out_of_range_is_validation_error() {
        let mut s = vec![section("A", 0)];
        assert!(matches!(remove(&mut s, 3), Err(HubError::Validation(_))));
        assert!(matches!(insert(&mut s, 5, section("x", 0)), Err(HubError::Validation(_))));
        assert!(matches!(
            move_section(&mut s, 1, Direction::Down),
            Err(HubError::Validation(_))
        ));
    }
}
