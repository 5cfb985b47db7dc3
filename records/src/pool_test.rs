use super::*;

fn item(id: &str, pool: &str, owner: &str) -> PoolItem {
    PoolItem { id: id.to_owned(), pool: pool.to_owned(), owner: owner.to_owned() }
}

fn sample_items() -> Vec<PoolItem> {
    vec![
        item("1", "Welding", "zoe@x.com"),
        item("2", "alpha shop", "bob@x.com"),
        item("3", "Carpentry", "amy@x.com"),
        item("4", "Ceramics", "bob@x.com"),
    ]
}

fn sample_pool() -> Pool {
    Pool {
        id: "p1".to_owned(),
        name: "Shop".to_owned(),
        owner: "o@x.com".to_owned(),
        members: vec!["o@x.com".to_owned(), "a@x.com".to_owned()],
    }
}

fn names(items: &[PoolItem]) -> Vec<&str> {
    items.iter().map(|i| i.pool.as_str()).collect()
}

// =============================================================================
// filter_and_sort
// =============================================================================

#[test]
fn empty_term_keeps_everything_sorted_by_name() {
    let out = filter_and_sort(&sample_items(), "", SortField::Pool, SortDirection::Asc);
    assert_eq!(names(&out), vec!["alpha shop", "Carpentry", "Ceramics", "Welding"]);
}

#[test]
fn filter_matches_name_case_insensitively() {
    let out = filter_and_sort(&sample_items(), "CER", SortField::Pool, SortDirection::Asc);
    assert_eq!(names(&out), vec!["Ceramics"]);
}

#[test]
fn filter_matches_owner() {
    let out = filter_and_sort(&sample_items(), "bob@", SortField::Pool, SortDirection::Asc);
    assert_eq!(names(&out), vec!["alpha shop", "Ceramics"]);
}

#[test]
fn filter_with_no_match_is_empty() {
    assert!(filter_and_sort(&sample_items(), "zzz", SortField::Pool, SortDirection::Asc).is_empty());
}

#[test]
fn sort_by_owner_keeps_input_order_for_equal_owners() {
    let out = filter_and_sort(&sample_items(), "", SortField::Owner, SortDirection::Asc);
    let ids = out.iter().map(|i| i.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["3", "2", "4", "1"]);
}

#[test]
fn filter_and_sort_is_idempotent() {
    let once = filter_and_sort(&sample_items(), "c", SortField::Pool, SortDirection::Desc);
    let twice = filter_and_sort(&once, "c", SortField::Pool, SortDirection::Desc);
    assert_eq!(once, twice);
}

#[test]
fn toggled_direction_reverses_distinct_keys() {
    let asc = filter_and_sort(&sample_items(), "", SortField::Pool, SortDirection::Asc);
    let desc = filter_and_sort(&sample_items(), "", SortField::Pool, SortDirection::Asc.toggle());
    let mut reversed = asc.clone();
    reversed.reverse();
    assert_eq!(desc, reversed);
}

#[test]
fn keys_differing_only_in_case_still_order_deterministically() {
    let items = vec![item("1", "shop", "a@x.com"), item("2", "Shop", "a@x.com")];
    let asc = filter_and_sort(&items, "", SortField::Pool, SortDirection::Asc);
    let desc = filter_and_sort(&items, "", SortField::Pool, SortDirection::Desc);
    assert_eq!(names(&asc), vec!["Shop", "shop"]);
    assert_eq!(names(&desc), vec!["shop", "Shop"]);
}

#[test]
fn sort_field_parses_aliases() {
    assert_eq!("pool".parse::<SortField>(), Ok(SortField::Pool));
    assert_eq!("Name".parse::<SortField>(), Ok(SortField::Pool));
    assert_eq!(" owner ".parse::<SortField>(), Ok(SortField::Owner));
    assert!("size".parse::<SortField>().is_err());
}

#[test]
fn delete_affordance_only_for_owner() {
    let row = item("1", "Welding", "zoe@x.com");
    assert!(row.can_delete("zoe@x.com"));
    assert!(!row.can_delete("bob@x.com"));
}

#[test]
fn pool_item_from_pool_maps_name() {
    let row = PoolItem::from(&sample_pool());
    assert_eq!(row, item("p1", "Shop", "o@x.com"));
}

// =============================================================================
// membership checks
// =============================================================================

#[test]
fn add_rejects_duplicate_member() {
    let pool = sample_pool();
    assert_eq!(check_new_member(&pool, "a@x.com"), Err(MemberError::AlreadyMember));
    assert_eq!(pool.members.len(), 2);
}

#[test]
fn add_rejects_owner_as_duplicate() {
    assert_eq!(check_new_member(&sample_pool(), "o@x.com"), Err(MemberError::AlreadyMember));
}

#[test]
fn add_rejects_empty_before_shape() {
    assert_eq!(check_new_member(&sample_pool(), "   "), Err(MemberError::Empty));
}

#[test]
fn add_rejects_malformed_email() {
    assert_eq!(check_new_member(&sample_pool(), "bob"), Err(MemberError::InvalidEmail));
}

#[test]
fn add_accepts_and_trims_new_member() {
    assert_eq!(check_new_member(&sample_pool(), "  new@x.com "), Ok("new@x.com".to_owned()));
}

#[test]
fn remove_rejects_owner() {
    let err = check_member_removal(&sample_pool(), "o@x.com").unwrap_err();
    assert_eq!(err, MemberError::IsOwner);
    assert_eq!(err.to_string(), "Cannot remove the pool owner");
}

#[test]
fn remove_rejects_non_member() {
    assert_eq!(check_member_removal(&sample_pool(), "ghost@x.com"), Err(MemberError::NotMember));
}

#[test]
fn remove_accepts_regular_member() {
    assert_eq!(check_member_removal(&sample_pool(), "a@x.com"), Ok(()));
}

#[test]
fn pool_deserializes_without_members() {
    let pool: Pool = serde_json::from_str(r#"{"id":"p","name":"n","owner":"o@x.com"}"#).unwrap();
    assert!(pool.members.is_empty());
    assert!(pool.has_member("o@x.com"));
}
