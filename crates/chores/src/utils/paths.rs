//! Document paths relative to the database root.

pub const EMAIL_KEY_PREFIX: &str = "email:";

pub fn user(uid: &str) -> String {
    format!("users/{uid}")
}

pub fn family(family_id: &str) -> String {
    format!("families/{family_id}")
}

pub fn members(family_id: &str) -> String {
    format!("families/{family_id}/members")
}

pub fn member(family_id: &str, member_id: &str) -> String {
    format!("families/{family_id}/members/{member_id}")
}

pub fn chores(family_id: &str) -> String {
    format!("families/{family_id}/chores")
}

pub fn chore(family_id: &str, chore_id: &str) -> String {
    format!("families/{family_id}/chores/{chore_id}")
}

pub fn usage(family_id: &str) -> String {
    format!("families/{family_id}/choreUsage")
}

pub fn usage_counter(family_id: &str, slug: &str) -> String {
    format!("families/{family_id}/choreUsage/{slug}")
}

pub fn invitation(email_key: &str) -> String {
    format!("invitations/{email_key}")
}

/// Family id of a member document path (`families/{id}/members/{member}`).
pub fn family_of_member(path: &str) -> Option<&str> {
    let mut segments = path.split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some("families"), Some(family_id), Some("members")) if !family_id.is_empty() => {
            Some(family_id)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_is_extracted_from_member_paths_only() {
        assert_eq!(family_of_member("families/f1/members/email:a@b.c"), Some("f1"));
        assert_eq!(family_of_member("families/f1/chores/c1"), None);
        assert_eq!(family_of_member("users/u1"), None);
    }
}
