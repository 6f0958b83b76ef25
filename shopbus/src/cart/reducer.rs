use tracing::{trace, warn};

use super::action::CartAction;
use super::state::{CartItem, CartState};

/// Cart reducer
///
/// Total over every action; anything that would not change the cart is a
/// logged no-op returning `false`.
pub fn reducer(state: &mut CartState, action: CartAction) -> bool {
    match action {
        CartAction::AddItem { id, name, price } => {
            if let Some(index) = state.position(&id) {
                // Name and price of an existing line are kept as they are
                let item = &mut state.items_mut()[index];
                if item.quantity == u32::MAX {
                    warn!(id = %id, "quantity already at maximum");
                    return false;
                }
                item.quantity += 1;
                return true;
            }

            let price = if price.is_finite() && price >= 0.0 {
                price
            } else {
                warn!(id = %id, price, "invalid price clamped to 0");
                0.0
            };
            state.items_mut().push(CartItem {
                id,
                name,
                price,
                quantity: 1,
            });
            true
        }

        CartAction::RemoveItem { id } => remove(state, &id),

        CartAction::UpdateQuantity { id, quantity } if quantity <= 0 => remove(state, &id),

        CartAction::UpdateQuantity { id, quantity } => {
            let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            match state.position(&id) {
                Some(index) => {
                    let item = &mut state.items_mut()[index];
                    if item.quantity == quantity {
                        return false;
                    }
                    item.quantity = quantity;
                    true
                }
                None => {
                    trace!(id = %id, "update for item not in cart");
                    false
                }
            }
        }

        CartAction::ClearCart => {
            if state.is_empty() {
                trace!("clear on empty cart");
                return false;
            }
            state.items_mut().clear();
            true
        }
    }
}

fn remove(state: &mut CartState, id: &str) -> bool {
    match state.position(id) {
        Some(index) => {
            state.items_mut().remove(index);
            true
        }
        None => {
            trace!(id, "remove for item not in cart");
            false
        }
    }
}
