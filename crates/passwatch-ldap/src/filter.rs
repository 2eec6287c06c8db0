//! LDAP filter construction for Active Directory user searches.

/// Filter matching enabled person-class user accounts.
///
/// The `userAccountControl:1.2.840.113556.1.4.803:` clause is the AD
/// bitwise-AND matching rule; bit `0x2` marks a disabled account, so the
/// negation keeps only enabled ones.
pub const ACTIVE_USER_FILTER: &str =
    "(&(objectCategory=person)(objectClass=user)(!(userAccountControl:1.2.840.113556.1.4.803:=2)))";

/// Attributes requested for each user entry.
pub fn user_attributes() -> Vec<&'static str> {
    vec![
        "sAMAccountName",
        "displayName",
        "mail",
        "pwdLastSet",
        "distinguishedName",
    ]
}

/// Escape special characters in LDAP filter values (RFC 4515).
///
/// Backslash is replaced first so the escapes it introduces are not
/// re-escaped.
pub fn escape_filter_value(value: &str) -> String {
    value
        .replace('\\', "\\5c")
        .replace('*', "\\2a")
        .replace('(', "\\28")
        .replace(')', "\\29")
        .replace('\0', "\\00")
}
