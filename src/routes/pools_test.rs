use super::*;
use records::MemberError;

#[test]
fn membership_errors_map_to_statuses() {
    let cases = [
        (MemberError::Empty, StatusCode::BAD_REQUEST),
        (MemberError::InvalidEmail, StatusCode::BAD_REQUEST),
        (MemberError::AlreadyMember, StatusCode::CONFLICT),
        (MemberError::IsOwner, StatusCode::CONFLICT),
        (MemberError::NotMember, StatusCode::NOT_FOUND),
    ];
    for (member, status) in cases {
        let code = member.code();
        let err = pool_error(&PoolError::Member(member));
        assert_eq!(err.status, status);
        assert_eq!(err.code, code);
    }
}

#[test]
fn ownership_and_lookup_errors_map_to_statuses() {
    assert_eq!(pool_error(&PoolError::Forbidden).status, StatusCode::FORBIDDEN);
    assert_eq!(pool_error(&PoolError::NotFound(Uuid::nil())).status, StatusCode::NOT_FOUND);
    assert_eq!(pool_error(&PoolError::EmptyName).status, StatusCode::BAD_REQUEST);
}

#[test]
fn non_uuid_ids_are_not_found() {
    let err = parse_pool_id("1712345678901").unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.message, records::messages::POOL_NOT_FOUND);

    let id = Uuid::new_v4();
    assert_eq!(parse_pool_id(&id.to_string()).unwrap(), id);
}
