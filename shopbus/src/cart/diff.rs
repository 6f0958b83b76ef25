//! Derive side effects from a committed cart transition
//!
//! [`diff`] compares two cart snapshots and lists what happened between them.
//! It knows nothing about the bus; [`CartEffects`](super::CartEffects) turns
//! each change into events.

use super::state::CartState;

/// One observable difference between two cart snapshots
#[derive(Debug, Clone, PartialEq)]
pub enum CartChange {
    /// Item present now but not before
    Added { id: String, name: String },
    /// Item present in both with a higher quantity now
    QuantityIncreased {
        id: String,
        name: String,
        from: u32,
        to: u32,
    },
    /// Item present before but not now
    Removed { id: String, name: String },
    /// Cart went from non-empty to empty
    Cleared,
}

impl CartChange {
    /// Id of the affected item, `None` for [`CartChange::Cleared`]
    pub fn id(&self) -> Option<&str> {
        match self {
            CartChange::Added { id, .. }
            | CartChange::QuantityIncreased { id, .. }
            | CartChange::Removed { id, .. } => Some(id),
            CartChange::Cleared => None,
        }
    }
}

/// Changes between `previous` and `current`, in a fixed order:
///
/// 1. additions and quantity increases, in `current` order
/// 2. removals, in `previous` order
/// 3. `Cleared`, if the cart was emptied
///
/// Quantity decreases produce nothing.
pub fn diff(previous: &CartState, current: &CartState) -> Vec<CartChange> {
    let mut changes = Vec::new();

    for item in current {
        match previous.get(&item.id) {
            None => changes.push(CartChange::Added {
                id: item.id.clone(),
                name: item.name.clone(),
            }),
            Some(before) if item.quantity > before.quantity => {
                changes.push(CartChange::QuantityIncreased {
                    id: item.id.clone(),
                    name: item.name.clone(),
                    from: before.quantity,
                    to: item.quantity,
                })
            }
            Some(_) => {}
        }
    }

    for item in previous {
        if !current.contains(&item.id) {
            changes.push(CartChange::Removed {
                id: item.id.clone(),
                name: item.name.clone(),
            });
        }
    }

    if !previous.is_empty() && current.is_empty() {
        changes.push(CartChange::Cleared);
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartAction;

    fn cart(items: &[(&str, &str)]) -> CartState {
        items.iter().fold(CartState::new(), |state, (id, name)| {
            state.apply(CartAction::add(*id, *name, 10.0))
        })
    }

    #[test]
    fn test_same_state_has_no_changes() {
        let state = cart(&[("1", "Mouse")]);
        assert!(diff(&state, &state).is_empty());
        assert!(diff(&CartState::new(), &CartState::new()).is_empty());
    }

    #[test]
    fn test_added() {
        let before = CartState::new();
        let after = cart(&[("1", "Mouse")]);
        assert_eq!(
            diff(&before, &after),
            vec![CartChange::Added {
                id: "1".into(),
                name: "Mouse".into()
            }]
        );
    }

    #[test]
    fn test_quantity_increase_and_decrease() {
        let one = cart(&[("1", "Mouse")]);
        let three = one.apply(CartAction::update_quantity("1", 3));

        assert_eq!(
            diff(&one, &three),
            vec![CartChange::QuantityIncreased {
                id: "1".into(),
                name: "Mouse".into(),
                from: 1,
                to: 3,
            }]
        );
        assert!(diff(&three, &one).is_empty());
    }

    #[test]
    fn test_removing_last_item_reports_removed_then_cleared() {
        let before = cart(&[("1", "Mouse")]);
        let after = before.apply(CartAction::remove("1"));
        assert_eq!(
            diff(&before, &after),
            vec![
                CartChange::Removed {
                    id: "1".into(),
                    name: "Mouse".into()
                },
                CartChange::Cleared,
            ]
        );
    }

    #[test]
    fn test_clear_reports_every_item_in_previous_order() {
        let before = cart(&[("2", "Keyboard"), ("1", "Mouse"), ("3", "Monitor")]);
        let after = before.apply(CartAction::ClearCart);

        let ids: Vec<_> = diff(&before, &after)
            .iter()
            .map(|change| change.id().map(str::to_string))
            .collect();
        assert_eq!(
            ids,
            vec![
                Some("2".to_string()),
                Some("1".to_string()),
                Some("3".to_string()),
                None
            ]
        );
    }

    #[test]
    fn test_additions_precede_removals() {
        let before = cart(&[("1", "Mouse")]);
        let after = cart(&[("2", "Keyboard")]);
        let changes = diff(&before, &after);
        assert!(matches!(changes[0], CartChange::Added { ref id, .. } if id == "2"));
        assert!(matches!(changes[1], CartChange::Removed { ref id, .. } if id == "1"));
        assert_eq!(changes.len(), 2);
    }
}
