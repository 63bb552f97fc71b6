use std::collections::BTreeMap;

use parking_lot::Mutex;
use serde::Serialize;

// ─── Domain types ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Book {
    pub title: String,
    pub category: String,
    /// Price in cents (e.g. 1099 = $10.99)
    pub price_cents: u64,
    pub image: String,
}

impl Book {
    fn new(title: &str, category: &str, price_cents: u64, image: &str) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            price_cents,
            image: image.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CartItem {
    pub book: Book,
    pub quantity: u32,
}

impl CartItem {
    pub fn total_cents(&self) -> u64 {
        self.book.price_cents * u64::from(self.quantity)
    }
}

/// Shopping cart keyed by book title.
#[derive(Debug, Default)]
pub struct Cart {
    items: BTreeMap<String, CartItem>,
}

impl Cart {
    /// Adding a title already in the cart increases its quantity.
    pub fn add_book(&mut self, book: &Book, quantity: u32) {
        self.items
            .entry(book.title.clone())
            .and_modify(|item| item.quantity = item.quantity.saturating_add(quantity))
            .or_insert_with(|| CartItem {
                book: book.clone(),
                quantity,
            });
    }

    pub fn remove_book(&mut self, title: &str) {
        self.items.remove(title);
    }

    /// Quantities of zero or less remove the title.
    pub fn update_quantity(&mut self, title: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove_book(title);
        } else if let Some(item) = self.items.get_mut(title) {
            item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    pub fn total_cents(&self) -> u64 {
        self.items.values().map(CartItem::total_cents).sum()
    }

    pub fn total_items(&self) -> u64 {
        self.items.values().map(|i| u64::from(i.quantity)).sum()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> impl Iterator<Item = &CartItem> {
        self.items.values()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ─── Store ───────────────────────────────────────────────────────

/// Fixed catalog plus the single shared cart.
pub struct Store {
    books: Vec<Book>,
    cart: Mutex<Cart>,
}

impl Store {
    /// The four-title demo catalog.
    pub fn with_demo_catalog() -> Self {
        Self::new(vec![
            Book::new("The Great Gatsby", "Fiction", 1099, "images/books/the_great_gatsby.jpg"),
            Book::new("1984", "Dystopia", 899, "images/books/1984.jpg"),
            Book::new("I Ching", "Traditional", 1899, "images/books/I-Ching.jpg"),
            Book::new("Moby Dick", "Adventure", 1249, "images/books/moby_dick.jpg"),
        ])
    }

    pub fn new(books: Vec<Book>) -> Self {
        Self {
            books,
            cart: Mutex::new(Cart::default()),
        }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn book_by_title(&self, title: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.title == title)
    }

    /// Case-insensitive category match.
    pub fn books_in_category(&self, category: &str) -> Vec<&Book> {
        self.books
            .iter()
            .filter(|b| b.category.eq_ignore_ascii_case(category))
            .collect()
    }

    /// Category name → number of titles, alphabetical.
    pub fn categories(&self) -> BTreeMap<&str, usize> {
        let mut out = BTreeMap::new();
        for book in &self.books {
            *out.entry(book.category.as_str()).or_insert(0) += 1;
        }
        out
    }

    /// Case-insensitive substring match on title or category.
    pub fn search(&self, query: &str) -> Vec<&Book> {
        let needle = query.to_lowercase();
        self.books
            .iter()
            .filter(|b| {
                b.title.to_lowercase().contains(&needle)
                    || b.category.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn cart(&self) -> parking_lot::MutexGuard<'_, Cart> {
        self.cart.lock()
    }
}

/// "$10.99" style formatting for cent amounts.
pub fn format_price(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_same_title_accumulates_quantity() {
        let store = Store::with_demo_catalog();
        let book = store.book_by_title("1984").expect("in catalog").clone();
        let mut cart = store.cart();
        cart.add_book(&book, 1);
        cart.add_book(&book, 2);
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_cents(), 3 * 899);
    }

    #[test]
    fn update_to_zero_removes_item() {
        let store = Store::with_demo_catalog();
        let book = store.book_by_title("Moby Dick").expect("in catalog").clone();
        let mut cart = store.cart();
        cart.add_book(&book, 1);
        cart.update_quantity("Moby Dick", 4);
        assert_eq!(cart.total_items(), 4);
        cart.update_quantity("Moby Dick", 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn update_of_missing_title_is_noop() {
        let mut cart = Cart::default();
        cart.update_quantity("Nope", 3);
        assert!(cart.is_empty());
    }

    #[test]
    fn total_spans_all_items() {
        let store = Store::with_demo_catalog();
        let gatsby = store.book_by_title("The Great Gatsby").expect("in catalog").clone();
        let ching = store.book_by_title("I Ching").expect("in catalog").clone();
        let mut cart = store.cart();
        cart.add_book(&gatsby, 2);
        cart.add_book(&ching, 1);
        assert_eq!(cart.total_cents(), 2 * 1099 + 1899);
        cart.clear();
        assert_eq!(cart.total_cents(), 0);
    }

    #[test]
    fn category_and_search_are_case_insensitive() {
        let store = Store::with_demo_catalog();
        assert_eq!(store.books_in_category("fiction").len(), 1);
        assert!(store.books_in_category("Poetry").is_empty());
        assert_eq!(store.search("MOBY").len(), 1);
        assert_eq!(store.search("dys").len(), 1);
        assert_eq!(store.categories().len(), 4);
    }

    #[test]
    fn prices_format_with_two_decimals() {
        assert_eq!(format_price(1099), "$10.99");
        assert_eq!(format_price(5), "$0.05");
    }
}
