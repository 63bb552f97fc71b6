//! Storefront pages. Plain business logic: these handlers know nothing
//! about metrics, the timing middleware wraps them from the outside.

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form,
};
use serde::Deserialize;
use std::fmt::Write;
use std::sync::Arc;

use crate::html;
use crate::store::{format_price, Book};
use crate::AppState;

use super::AppError;

// ─── Request types ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CartForm {
    pub title: String,
    #[serde(default)]
    pub quantity: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TitleForm {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

// ─── GET / ───────────────────────────────────────────────────────

pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let books: Vec<&Book> = state.store.books().iter().collect();
    Html(render_book_list(&state, "All books", &books))
}

// ─── GET /category/:name ─────────────────────────────────────────

pub async fn browse_category(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Html<String>, Redirect> {
    let books = state.store.books_in_category(&name);
    if books.is_empty() {
        return Err(Redirect::to("/"));
    }
    Ok(Html(render_book_list(
        &state,
        &format!("Category: {name}"),
        &books,
    )))
}

// ─── GET /categories ─────────────────────────────────────────────

pub async fn list_categories(State(state): State<Arc<AppState>>) -> Html<String> {
    let mut body = String::from("<h1>Categories</h1>\n<ul>\n");
    for (category, count) in state.store.categories() {
        let _ = writeln!(
            body,
            "<li><a href=\"/category/{0}\">{0}</a> ({1})</li>",
            html::escape(category),
            count
        );
    }
    body.push_str("</ul>\n");
    Html(html::page("Categories", "", &body))
}

// ─── GET /search?query= ──────────────────────────────────────────

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, Redirect> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err(Redirect::to("/"));
    }
    let books = state.store.search(query);
    Ok(Html(render_book_list(
        &state,
        &format!("Found {} book(s) for \"{}\"", books.len(), query),
        &books,
    )))
}

// ─── POST /add-to-cart ───────────────────────────────────────────

pub async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CartForm>,
) -> Result<Redirect, AppError> {
    let quantity = parse_quantity(form.quantity.as_deref())?;
    if quantity < 1 {
        return Err(AppError::BadRequest("quantity must be at least 1".into()));
    }
    let quantity = u32::try_from(quantity)
        .map_err(|_| AppError::BadRequest("quantity is too large".into()))?;

    let book = state
        .store
        .book_by_title(&form.title)
        .ok_or_else(|| AppError::NotFound(format!("book '{}' not found", form.title)))?;

    state.store.cart().add_book(book, quantity);
    Ok(Redirect::to("/"))
}

// ─── POST /update-cart ───────────────────────────────────────────

pub async fn update_cart(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CartForm>,
) -> Result<Redirect, AppError> {
    let quantity = parse_quantity(form.quantity.as_deref())?;
    state.store.cart().update_quantity(&form.title, quantity);
    Ok(Redirect::to("/cart"))
}

// ─── POST /remove-from-cart ──────────────────────────────────────

pub async fn remove_from_cart(
    State(state): State<Arc<AppState>>,
    Form(form): Form<TitleForm>,
) -> Redirect {
    state.store.cart().remove_book(&form.title);
    Redirect::to("/cart")
}

// ─── POST /clear-cart ────────────────────────────────────────────

pub async fn clear_cart(State(state): State<Arc<AppState>>) -> Redirect {
    state.store.cart().clear();
    Redirect::to("/cart")
}

// ─── GET /cart ───────────────────────────────────────────────────

pub async fn view_cart(State(state): State<Arc<AppState>>) -> Html<String> {
    let cart = state.store.cart();
    let mut body = String::from("<h1>Your cart</h1>\n");
    if cart.is_empty() {
        body.push_str("<p class=\"empty\">Your cart is empty.</p>\n");
    } else {
        body.push_str("<table>\n<tr><th>Title</th><th>Qty</th><th>Subtotal</th></tr>\n");
        for item in cart.items() {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                html::escape(&item.book.title),
                item.quantity,
                format_price(item.total_cents())
            );
        }
        let _ = writeln!(
            body,
            "</table>\n<p>{} item(s), total {}</p>",
            cart.total_items(),
            format_price(cart.total_cents())
        );
    }
    drop(cart);
    Html(html::page("Cart", "", &body))
}

// ─── GET /checkout ───────────────────────────────────────────────

pub async fn checkout(State(state): State<Arc<AppState>>) -> Result<Html<String>, Redirect> {
    let cart = state.store.cart();
    if cart.is_empty() {
        return Err(Redirect::to("/"));
    }
    let body = format!(
        "<h1>Checkout</h1>\n<p>{} item(s). Amount due: {}</p>\n",
        cart.total_items(),
        format_price(cart.total_cents())
    );
    drop(cart);
    Ok(Html(html::page("Checkout", "", &body)))
}

// ─── Helpers ─────────────────────────────────────────────────────

/// Blank input means 1; decimals and non-numbers are rejected.
fn parse_quantity(raw: Option<&str>) -> Result<i64, AppError> {
    let raw = raw.map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return Ok(1);
    }
    if raw.contains('.') {
        return Err(AppError::BadRequest("quantity must be a whole number".into()));
    }
    raw.parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("invalid quantity '{raw}'")))
}

fn render_book_list(state: &AppState, heading: &str, books: &[&Book]) -> String {
    let mut body = String::with_capacity(1024);
    let _ = writeln!(body, "<h1>{}</h1>\n<ul>", html::escape(heading));
    for book in books {
        let _ = writeln!(
            body,
            "<li>{} <small>({})</small> {}</li>",
            html::escape(&book.title),
            html::escape(&book.category),
            format_price(book.price_cents)
        );
    }
    let items = state.store.cart().total_items();
    let _ = writeln!(body, "</ul>\n<p><a href=\"/cart\">Cart ({items})</a></p>");
    html::page("Bookstore", "", &body)
}
