use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceExt;

const CATEGORIES: &[&str] = &["Fiction", "Dystopia", "Traditional", "Adventure"];
const TITLES: &[&str] = &["The Great Gatsby", "1984", "I Ching", "Moby Dick"];

/// Pause between page views, in milliseconds.
const THINK_TIME_MS: std::ops::Range<u64> = 20..150;

/// Totals reported when a run finishes.
#[derive(Debug, Default)]
pub struct RunTotals {
    pub requests: AtomicU64,
    pub failures: AtomicU64,
}

// ─── Public entry point ──────────────────────────────────────────

/// Spawns `users` simulated shoppers that browse the store through `app`
/// until the deadline or until `running` is cleared. Every request goes
/// through the full middleware stack, so it lands in the metrics registry
/// exactly like real traffic.
pub async fn run(running: Arc<AtomicBool>, app: Router, users: u32, duration_secs: u64) {
    let deadline = Instant::now() + Duration::from_secs(duration_secs);
    let totals = Arc::new(RunTotals::default());

    let mut handles = Vec::with_capacity(users as usize);

    for user_id in 0..users {
        let running = running.clone();
        let app = app.clone();
        let totals = totals.clone();

        handles.push(tokio::spawn(async move {
            shopper(user_id, running, app, deadline, totals).await;
        }));
    }

    // Wait for all shoppers to finish
    for h in handles {
        if let Err(e) = h.await {
            tracing::warn!(error = %e, "simulated shopper task failed");
        }
    }

    tracing::info!(
        users,
        requests = totals.requests.load(Ordering::Relaxed),
        failures = totals.failures.load(Ordering::Relaxed),
        "traffic simulation finished"
    );

    // Mark simulation as finished
    running.store(false, Ordering::SeqCst);
}

// ─── Shopper loop ────────────────────────────────────────────────

async fn shopper(
    id: u32,
    running: Arc<AtomicBool>,
    app: Router,
    deadline: Instant,
    totals: Arc<RunTotals>,
) {
    // Each shopper gets its own deterministic RNG seeded uniquely.
    let mut rng = StdRng::seed_from_u64(1000 + id as u64);

    while running.load(Ordering::Relaxed) && Instant::now() < deadline {
        for step in session_script(&mut rng) {
            if !running.load(Ordering::Relaxed) {
                return;
            }
            let status = send(app.clone(), &step).await;
            totals.requests.fetch_add(1, Ordering::Relaxed);
            if status.is_server_error() || status.is_client_error() {
                totals.failures.fetch_add(1, Ordering::Relaxed);
            }
            let pause = rng.gen_range(THINK_TIME_MS);
            tokio::time::sleep(Duration::from_millis(pause)).await;
        }
    }
}

// ─── Session script ──────────────────────────────────────────────

/// One page view or form submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub method: Method,
    pub uri: String,
    /// urlencoded form body for POSTs
    pub form: Option<String>,
}

impl Step {
    fn get(uri: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            uri: uri.into(),
            form: None,
        }
    }

    fn post(uri: impl Into<String>, form: String) -> Self {
        Self {
            method: Method::POST,
            uri: uri.into(),
            form: Some(form),
        }
    }
}

/// A typical visit: home page, a random category, add a random book,
/// view the cart, and check out half of the time.
pub fn session_script(rng: &mut impl Rng) -> Vec<Step> {
    let category = CATEGORIES.choose(rng).copied().unwrap_or("Fiction");
    let title = TITLES.choose(rng).copied().unwrap_or("1984");
    let form = serde_urlencoded::to_string(&[("title", title), ("quantity", "1")][..])
        .unwrap_or_default();

    let mut steps = vec![
        Step::get("/"),
        Step::get(format!("/category/{category}")),
        Step::post("/add-to-cart", form),
        Step::get("/cart"),
    ];
    if rng.gen_bool(0.5) {
        steps.push(Step::get("/checkout"));
    }
    steps
}

async fn send(app: Router, step: &Step) -> StatusCode {
    let mut builder = Request::builder().method(step.method.clone()).uri(&step.uri);
    let body = match &step.form {
        Some(form) => {
            builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            Body::from(form.clone())
        }
        None => Body::empty(),
    };

    let request = match builder.body(body) {
        Ok(req) => req,
        Err(e) => {
            tracing::warn!(uri = %step.uri, error = %e, "could not build simulated request");
            return StatusCode::BAD_REQUEST;
        }
    };

    match app.oneshot(request).await {
        Ok(response) => response.status(),
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_follows_the_shopping_path() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let steps = session_script(&mut rng);
            assert!(steps.len() == 4 || steps.len() == 5);
            assert_eq!(steps[0], Step::get("/"));
            assert!(steps[1].uri.starts_with("/category/"));
            assert_eq!(steps[2].method, Method::POST);
            assert!(steps[2].form.as_deref().unwrap_or("").starts_with("title="));
            assert_eq!(steps[3], Step::get("/cart"));
            if steps.len() == 5 {
                assert_eq!(steps[4], Step::get("/checkout"));
            }
        }
    }

    #[test]
    fn titles_are_form_encoded() {
        let mut rng = StdRng::seed_from_u64(1);
        let encoded: Vec<String> = (0..50)
            .filter_map(|_| session_script(&mut rng)[2].form.clone())
            .collect();
        assert!(encoded.iter().all(|f| !f.contains(' ')));
    }
}
