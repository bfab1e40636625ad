//! Address formatting for reverse-geocoding results.

use crate::platform::Placemark;

/// Fixed fallback address shown when geocoding fails or returns nothing.
pub const UNKNOWN_ADDRESS: &str = "عنوان غير محدد";

/// Joins the non-empty components of the first placemark into a display
/// address: name, street, district, city, region, separated by `", "`.
///
/// Missing components are skipped, never rendered as empty segments. A
/// placemark with no components at all yields [`UNKNOWN_ADDRESS`].
pub(crate) fn format_address(placemarks: &[Placemark]) -> String {
    let Some(place) = placemarks.first() else {
        return UNKNOWN_ADDRESS.to_string();
    };

    let parts: Vec<&str> = [
        place.name.as_deref(),
        place.street.as_deref(),
        place.district.as_deref(),
        place.city.as_deref(),
        place.region.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect();

    if parts.is_empty() {
        UNKNOWN_ADDRESS.to_string()
    } else {
        parts.join(", ")
    }
}
