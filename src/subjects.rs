//! The fixed registry of JAMB UTME subjects.

use serde::Serialize;

/// A subject offered in the UTME
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Subject {
    /// Stable identifier used in URLs and database rows
    pub id: &'static str,
    /// Human-readable display name
    pub name: &'static str,
}

/// All subjects the application recognises, in display order
pub const SUBJECTS: [Subject; 15] = [
    Subject { id: "english", name: "English Language" },
    Subject { id: "mathematics", name: "Mathematics" },
    Subject { id: "physics", name: "Physics" },
    Subject { id: "chemistry", name: "Chemistry" },
    Subject { id: "biology", name: "Biology" },
    Subject { id: "literature", name: "Literature in English" },
    Subject { id: "government", name: "Government" },
    Subject { id: "commerce", name: "Commerce" },
    Subject { id: "accounting", name: "Accounting" },
    Subject { id: "economics", name: "Economics" },
    Subject { id: "crk", name: "Christian Religious Studies" },
    Subject { id: "irk", name: "Islamic Religious Studies" },
    Subject { id: "geography", name: "Geography" },
    Subject { id: "agric", name: "Agricultural Science" },
    Subject { id: "history", name: "History" },
];

/// Looks up a subject by its id
pub fn find(id: &str) -> Option<Subject> {
    SUBJECTS.iter().find(|subject| subject.id == id).copied()
}

/// The display name for a subject id, falling back to the id itself
///
/// Unknown ids pass through unchanged so that rows synced under an id the
/// registry has not caught up with still render something sensible.
pub fn display_name(id: &str) -> String {
    find(id).map_or_else(|| id.to_string(), |subject| subject.name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_known_subject() {
        let subject = find("english").unwrap();
        assert_eq!(subject.name, "English Language");
    }

    #[test]
    fn test_find_unknown_subject() {
        assert_eq!(find("astrology"), None);
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        assert_eq!(display_name("crk"), "Christian Religious Studies");
        assert_eq!(display_name("astrology"), "astrology");
    }

    #[test]
    fn test_subject_ids_are_unique() {
        let mut ids: Vec<_> = SUBJECTS.iter().map(|subject| subject.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), SUBJECTS.len());
    }
}
