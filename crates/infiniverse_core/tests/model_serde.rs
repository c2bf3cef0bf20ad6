use infiniverse_core::{
    AccountName, LandBounds, Parcel, Placement, SourceKey, SourceKind, Transform, Vector3,
};
use serde_json::json;
use std::num::NonZeroU64;

fn account(name: &str) -> AccountName {
    AccountName::new(name).unwrap()
}

#[test]
fn parcel_serializes_with_flat_bounds_and_plain_owner() {
    let parcel = Parcel {
        id: 3,
        owner: account("alice"),
        bounds: LandBounds::new(10.5, 20.5, 10.0, 20.0),
        reg_end_date: 1_731_536_000,
    };

    let value = serde_json::to_value(&parcel).unwrap();
    assert_eq!(
        value,
        json!({
            "id": 3,
            "owner": "alice",
            "bounds": {
                "lat_north": 10.5,
                "long_east": 20.5,
                "lat_south": 10.0,
                "long_west": 20.0
            },
            "reg_end_date": 1_731_536_000
        })
    );

    let decoded: Parcel = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, parcel);
}

#[test]
fn placement_source_kind_uses_snake_case_tags() {
    let placement = Placement {
        id: 9,
        parcel_id: 3,
        source: SourceKey::poly(4),
        transform: Transform::new(
            Vector3::new(0.5, 0.0, 0.5),
            Vector3::new(0.0, 45.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
        ),
        payer: account("bob"),
    };

    let value = serde_json::to_value(&placement).unwrap();
    assert_eq!(value["source"], json!({ "kind": "poly", "id": 4 }));
    assert_eq!(value["payer"], json!("bob"));
    assert_eq!(value["transform"]["orientation"]["y"], json!(45.0));

    let other = SourceKey {
        kind: SourceKind::Other(NonZeroU64::new(7).unwrap()),
        id: 1,
    };
    assert_eq!(
        serde_json::to_value(other).unwrap(),
        json!({ "kind": { "other": 7 }, "id": 1 })
    );

    let reserved_tag =
        serde_json::from_value::<SourceKey>(json!({ "kind": { "other": 0 }, "id": 1 }));
    assert!(reserved_tag.is_err());
}

#[test]
fn invalid_account_names_are_rejected_on_deserialize() {
    for bad in ["\"Alice\"", "\"alice.\"", "\"\"", "\"abcdefghijklm\"", "\"alice6\""] {
        let result = serde_json::from_str::<AccountName>(bad);
        assert!(result.is_err(), "{bad} should be rejected");
    }

    let ok: AccountName = serde_json::from_str("\"infiniverse1\"").unwrap();
    assert_eq!(ok.as_str(), "infiniverse1");
}
