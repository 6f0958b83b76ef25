use crate::Action;

/// Intents accepted by the cart reducer
#[derive(Action, Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Append a new item, or bump the quantity of an existing one
    AddItem { id: String, name: String, price: f64 },
    RemoveItem { id: String },
    /// A quantity of zero or less removes the item
    UpdateQuantity { id: String, quantity: i64 },
    ClearCart,
}

impl CartAction {
    pub fn add(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        CartAction::AddItem {
            id: id.into(),
            name: name.into(),
            price,
        }
    }

    pub fn remove(id: impl Into<String>) -> Self {
        CartAction::RemoveItem { id: id.into() }
    }

    pub fn update_quantity(id: impl Into<String>, quantity: i64) -> Self {
        CartAction::UpdateQuantity {
            id: id.into(),
            quantity,
        }
    }
}
