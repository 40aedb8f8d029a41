use super::*;
use permit_watcher::extractor::StatusExtractor;
use permit_watcher::models::ListingStatus;

fn extractor(policy: AmbiguityPolicy) -> StatusExtractor {
    StatusExtractor::new(TARGET_URL, "$67.45", policy)
}

#[test]
fn test_sold_out_card_among_available_neighbours() {
    let record = extractor(AmbiguityPolicy::SoldOut)
        .extract(&reservation_page("Sold Out"), LISTING)
        .unwrap();

    assert_eq!(record.status, ListingStatus::SoldOut);
    assert_eq!(record.price, "$67.45");
    assert!(!record.purchasable);
}

#[test]
fn test_available_card() {
    let record = extractor(AmbiguityPolicy::SoldOut)
        .extract(&reservation_page("<button>Add to Cart</button>"), LISTING)
        .unwrap();

    assert_eq!(record.status, ListingStatus::Available);
    assert_eq!(record.url, TARGET_URL);
    assert!(record.purchasable);
}

#[test]
fn test_card_without_status_follows_policy() {
    let page = format!(
        r#"<div class="product-card"><div class="product-name">{LISTING}</div><div class="product-price">$67.45</div><div class="product-action">Coming soon</div></div>"#
    );

    let pessimistic = extractor(AmbiguityPolicy::SoldOut).extract(&page, LISTING).unwrap();
    let surfaced = extractor(AmbiguityPolicy::Unknown).extract(&page, LISTING).unwrap();

    assert_eq!(pessimistic.status, ListingStatus::SoldOut);
    assert_eq!(surfaced.status, ListingStatus::Unknown);
}

#[test]
fn test_listing_removed_from_page() {
    let page = reservation_page("Sold Out").replace(LISTING, "Spring 2026 Parking");
    assert!(extractor(AmbiguityPolicy::SoldOut).extract(&page, LISTING).is_none());
}

#[test]
fn test_plain_text_rendering() {
    // Some renders come back as text only
    let text = format!("Reserve Parking\n{LISTING}\n$67.45\nSOLD OUT\nEvening Permit $45.00 Add to Cart");
    let record = extractor(AmbiguityPolicy::SoldOut).extract(&text, LISTING).unwrap();

    assert_eq!(record.status, ListingStatus::SoldOut);
    assert_eq!(record.price, "$67.45");
}
