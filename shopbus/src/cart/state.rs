use serde::Serialize;

use super::action::CartAction;
use super::reducer::reducer;

/// A line in the cart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    /// Unit price, never negative
    pub price: f64,
    /// Always at least 1
    pub quantity: u32,
}

impl CartItem {
    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Cart contents in insertion order
///
/// Ids are unique. Updates happen in place, so an item keeps its position
/// for as long as it stays in the cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CartState {
    items: Vec<CartItem>,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub(crate) fn items_mut(&mut self) -> &mut Vec<CartItem> {
        &mut self.items
    }

    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub(crate) fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities
    pub fn total_items(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |total, item| total.saturating_add(item.quantity))
    }

    /// Sum of price times quantity, recomputed on every call
    pub fn total_price(&self) -> f64 {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// The state after `action`, leaving `self` untouched
    pub fn apply(&self, action: CartAction) -> CartState {
        let mut next = self.clone();
        reducer(&mut next, action);
        next
    }
}

impl<'a> IntoIterator for &'a CartState {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> CartState {
        CartState::new()
            .apply(CartAction::add("1", "Mouse", 29.99))
            .apply(CartAction::add("2", "Keyboard", 79.5))
            .apply(CartAction::update_quantity("1", 3))
    }

    #[test]
    fn test_totals() {
        let state = cart();
        assert_eq!(state.total_items(), 4);
        assert!((state.total_price() - (29.99 * 3.0 + 79.5)).abs() < 1e-9);
    }

    #[test]
    fn test_empty_totals() {
        let state = CartState::new();
        assert_eq!(state.total_items(), 0);
        assert_eq!(state.total_price(), 0.0);
    }

    #[test]
    fn test_apply_leaves_original() {
        let before = cart();
        let after = before.apply(CartAction::ClearCart);
        assert_eq!(before.len(), 2);
        assert!(after.is_empty());
    }

    #[test]
    fn test_serializes_as_list() {
        let state = CartState::new().apply(CartAction::add("1", "Mouse", 29.99));
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            serde_json::json!([{"id": "1", "name": "Mouse", "price": 29.99, "quantity": 1}])
        );
    }
}
