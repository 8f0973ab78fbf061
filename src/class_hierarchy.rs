//! Subtype queries against the static Roblox class hierarchy.

/// Tells whether `class` is `ancestor` or a subclass of it, the same question
/// the engine's `Instance:IsA` answers.
///
/// Backed by the bundled reflection database. A class the database doesn't
/// know about only matches itself by exact name.
pub fn is_class_a(class: &str, ancestor: &str) -> bool {
    let database = rbx_reflection_database::get();

    let mut current_class = Some(class);

    while let Some(class_name) = current_class {
        if class_name == ancestor {
            return true;
        }

        current_class = database
            .classes
            .get(class_name)
            .and_then(|descriptor| descriptor.superclass.as_deref());
    }

    false
}
