pub mod listings;
pub mod names;

pub use listings::Listing;

/// Directory page HTML → listings, in page order.
pub fn extract_listings(html: &str) -> Vec<Listing> {
    listings::extract(html)
}
