/// A product the demo can put in the cart
#[derive(Debug, Clone, Copy)]
pub struct Product {
    pub id: &'static str,
    pub name: &'static str,
    pub price: f64,
}

pub const PRODUCTS: &[Product] = &[
    Product {
        id: "1",
        name: "Wireless Headphones",
        price: 99.99,
    },
    Product {
        id: "2",
        name: "Smart Watch",
        price: 299.99,
    },
    Product {
        id: "3",
        name: "Laptop Stand",
        price: 49.99,
    },
    Product {
        id: "4",
        name: "Wireless Mouse",
        price: 29.99,
    },
    Product {
        id: "5",
        name: "USB-C Hub",
        price: 79.99,
    },
    Product {
        id: "6",
        name: "Bluetooth Speaker",
        price: 59.99,
    },
];

pub fn product(id: &str) -> Option<&'static Product> {
    PRODUCTS.iter().find(|p| p.id == id)
}
