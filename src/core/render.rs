//! Projects queue state into message text.

use super::store::Member;

/// Render the queue body.
///
/// With `use_template` only the member list is produced (the transport wraps it
/// in a titled rich message); otherwise the title heads a plain-text listing.
pub fn render(snapshot: &[Member], title: &str, use_template: bool) -> String {
    let names = snapshot.iter().map(|m| m.display_name.as_str());
    if use_template {
        names.collect::<Vec<_>>().join("\n")
    } else {
        let mut text = title.to_string();
        for name in names {
            text.push('\n');
            text.push_str(name);
        }
        text
    }
}
