#![forbid(unsafe_code)]

//! Arrangement strategies for the panel stack.
//!
//! An [`Arranger`] turns "how many panels, which one is active, how big is
//! the viewport" into one [`Placement`] per panel. Offsets are relative to
//! the viewport origin, so the active panel always sits at `(0, 0)`.

/// Where a panel sits after a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Position of the panel in the stack.
    pub panel: usize,
    pub x: i32,
    pub y: i32,
    /// Whether the panel overlaps the viewport.
    pub visible: bool,
}

/// Pluggable arrangement strategy.
pub trait Arranger {
    /// Stable identifier, used in logs.
    fn name(&self) -> &'static str;

    /// Compute placements for `count` panels with `active` in view.
    ///
    /// `active` is always `< count` when `count > 0`.
    fn arrange(&self, count: usize, active: usize, extent: u16) -> Vec<Placement>;
}

/// Signed distance from `active`, scaled by `extent`, clamped to `i32`.
fn axis_offset(panel: usize, active: usize, extent: u16) -> i32 {
    let delta = panel as i64 - active as i64;
    delta
        .saturating_mul(i64::from(extent))
        .clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Panels stacked top to bottom.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopBottomArranger;

impl Arranger for TopBottomArranger {
    fn name(&self) -> &'static str {
        "top_bottom"
    }

    fn arrange(&self, count: usize, active: usize, extent: u16) -> Vec<Placement> {
        (0..count)
            .map(|panel| Placement {
                panel,
                x: 0,
                y: axis_offset(panel, active, extent),
                visible: panel == active,
            })
            .collect()
    }
}

/// Panels laid out left to right.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeftRightArranger;

impl Arranger for LeftRightArranger {
    fn name(&self) -> &'static str {
        "left_right"
    }

    fn arrange(&self, count: usize, active: usize, extent: u16) -> Vec<Placement> {
        (0..count)
            .map(|panel| Placement {
                panel,
                x: axis_offset(panel, active, extent),
                y: 0,
                visible: panel == active,
            })
            .collect()
    }
}

/// Panels piled on the origin; only the active one shows.
#[derive(Debug, Clone, Copy, Default)]
pub struct CardArranger;

impl Arranger for CardArranger {
    fn name(&self) -> &'static str {
        "card"
    }

    fn arrange(&self, count: usize, active: usize, _extent: u16) -> Vec<Placement> {
        (0..count)
            .map(|panel| Placement {
                panel,
                x: 0,
                y: 0,
                visible: panel == active,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_bottom_offsets_relative_to_active() {
        let placements = TopBottomArranger.arrange(3, 1, 400);
        let ys: Vec<i32> = placements.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![-400, 0, 400]);
        assert!(placements.iter().all(|p| p.x == 0));
        assert_eq!(
            placements.iter().filter(|p| p.visible).count(),
            1,
            "exactly one panel in view"
        );
        assert!(placements[1].visible);
    }

    #[test]
    fn left_right_uses_horizontal_axis() {
        let placements = LeftRightArranger.arrange(2, 0, 80);
        assert_eq!((placements[0].x, placements[1].x), (0, 80));
        assert!(placements.iter().all(|p| p.y == 0));
    }

    #[test]
    fn card_piles_everything_on_origin() {
        let placements = CardArranger.arrange(4, 2, 400);
        assert!(placements.iter().all(|p| p.x == 0 && p.y == 0));
        assert!(placements[2].visible);
        assert!(!placements[3].visible);
    }

    #[test]
    fn empty_stack_has_no_placements() {
        assert!(TopBottomArranger.arrange(0, 0, 400).is_empty());
    }

    #[test]
    fn huge_offsets_saturate() {
        assert_eq!(axis_offset(usize::MAX / 2, 0, u16::MAX), i32::MAX);
    }
}
