use super::*;

#[test]
fn normalize_email_lowercases_and_trims() {
    assert_eq!(normalize_email(" Root@Example.COM\n"), Some("root@example.com".to_owned()));
}

#[test]
fn normalize_email_rejects_malformed() {
    for raw in ["", "root", "root@", "@example.com", "root@example", "a b@example.com", "a@b@c.io"] {
        assert_eq!(normalize_email(raw), None, "{raw:?}");
    }
}

#[test]
fn admin_role_detection_handles_lists() {
    assert!(is_admin_role(Some("admin")));
    assert!(is_admin_role(Some("user, Admin")));
    assert!(!is_admin_role(Some("user")));
    assert!(!is_admin_role(Some("superadmin")));
    assert!(!is_admin_role(None));
}

#[test]
fn promoted_role_keeps_existing_roles() {
    assert_eq!(promoted_role(None), "admin");
    assert_eq!(promoted_role(Some("")), "admin");
    assert_eq!(promoted_role(Some("  ")), "admin");
    assert_eq!(promoted_role(Some("user")), "user,admin");
    assert_eq!(promoted_role(Some("user,support")), "user,support,admin");
    assert!(is_admin_role(Some(&promoted_role(Some("user")))));
}

#[test]
fn outcome_messages() {
    let promoted = PromoteOutcome::Promoted { email: "a@b.io".into() };
    assert_eq!(promoted.message(), "a@b.io is now an admin");
    let already = PromoteOutcome::AlreadyAdmin { email: "a@b.io".into() };
    assert_eq!(already.message(), "a@b.io is already an admin");
}

#[test]
fn error_messages() {
    assert_eq!(CliError::UserNotFound("a@b.io".into()).to_string(), "no user with email a@b.io");
    assert_eq!(CliError::InvalidEmail("nope".into()).to_string(), "invalid email address: \"nope\"");
}
