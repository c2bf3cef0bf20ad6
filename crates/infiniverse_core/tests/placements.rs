use infiniverse_core::db::open_db_in_memory;
use infiniverse_core::geo::meters_to_lat_dist;
use infiniverse_core::{
    AccountName, FixedClock, LandBounds, LandRequest, ParcelId, PlacementRequest,
    PlacementUpdate, Quantity, RecordingTransferSink, Registry, RegistryConfig, RegistryError,
    Signers, SourceKind, Symbol, Transform, ValidationError, Vector3,
};

type TestRegistry = Registry<RecordingTransferSink, FixedClock>;

const POLY_A: &str = "AAAAAAAAAAA";
const POLY_B: &str = "bbbbbbbbbbb";

fn account(name: &str) -> AccountName {
    AccountName::new(name).unwrap()
}

fn transform() -> Transform {
    Transform::new(
        Vector3::new(0.25, 0.0, 0.75),
        Vector3::new(0.0, 90.0, 0.0),
        Vector3::new(1.0, 1.0, 1.0),
    )
}

struct World {
    registry: TestRegistry,
    sink: RecordingTransferSink,
    alice: AccountName,
    bob: AccountName,
    alice_land: ParcelId,
    alice_second_land: ParcelId,
    bob_land: ParcelId,
}

impl World {
    fn new() -> Self {
        let sink = RecordingTransferSink::new();
        let mut registry = Registry::with_clock(
            open_db_in_memory().unwrap(),
            RegistryConfig::default(),
            sink.clone(),
            FixedClock(1_700_000_000),
        )
        .unwrap();
        let alice = account("alice");
        let bob = account("bob");

        let alice_land = claim(&mut registry, &alice, 10.0);
        let alice_second_land = claim(&mut registry, &alice, 11.0);
        let bob_land = claim(&mut registry, &bob, 12.0);
        sink.drain();

        Self {
            registry,
            sink,
            alice,
            bob,
            alice_land,
            alice_second_land,
            bob_land,
        }
    }

    fn signed(&self, owners: &[&AccountName]) -> Signers {
        owners
            .iter()
            .fold(Signers::new(), |signers, owner| signers.with((*owner).clone()))
    }

    fn place(&mut self, parcel_id: ParcelId, poly_id: &str) -> Result<u64, RegistryError> {
        let signers = self.signed(&[&self.alice, &self.bob]);
        self.registry.persist_placement(
            &signers,
            &PlacementRequest {
                parcel_id,
                poly_id: poly_id.to_string(),
                transform: transform(),
            },
        )
    }
}

fn claim(registry: &mut TestRegistry, owner: &AccountName, lat_south: f64) -> ParcelId {
    let signers = Signers::single(owner.clone());
    registry.open_balance(&signers, owner).unwrap();
    let self_account = registry.config().self_account.clone();
    registry
        .on_external_credit(
            owner,
            &self_account,
            &Quantity::new(1_000_000_000, Symbol::new("INF", 4)),
            "",
        )
        .unwrap();

    let side = meters_to_lat_dist(10.0);
    registry
        .register_land(
            &signers,
            &LandRequest {
                owner: owner.clone(),
                bounds: LandBounds::new(lat_south + side, 20.0 + side, lat_south, 20.0),
            },
        )
        .unwrap()
        .id
}

fn validation(err: RegistryError) -> ValidationError {
    match err {
        RegistryError::Validation(reason) => reason,
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn shared_poly_is_deduplicated_and_evicted_with_its_last_placement() {
    let mut world = World::new();
    let alice_land = world.alice_land;
    let second_land = world.alice_second_land;

    let first = world.place(alice_land, POLY_A).unwrap();
    let second = world.place(second_land, POLY_A).unwrap();

    let first_source = world.registry.get_placement(first).unwrap().unwrap().source;
    let second_source = world.registry.get_placement(second).unwrap().unwrap().source;
    assert_eq!(first_source, second_source);
    assert_eq!(first_source.kind, SourceKind::Poly);
    assert_eq!(
        world.registry.list_catalog_entries(&world.alice).unwrap().len(),
        1
    );

    let signers = Signers::single(world.alice.clone());
    let evicted = world.registry.delete_placement(&signers, first).unwrap();
    assert_eq!(evicted, None);
    let entry = world
        .registry
        .get_catalog_entry(first_source.id)
        .unwrap()
        .unwrap();
    assert_eq!(entry.poly_id, POLY_A);
    assert_eq!(entry.owner, world.alice);

    let evicted = world.registry.delete_placement(&signers, second).unwrap();
    assert_eq!(evicted, Some(first_source.id));
    assert!(world
        .registry
        .get_catalog_entry(first_source.id)
        .unwrap()
        .is_none());
    assert!(world.registry.get_placement(second).unwrap().is_none());
}

#[test]
fn same_poly_id_gets_separate_entries_per_owner() {
    let mut world = World::new();
    let alice_land = world.alice_land;
    let bob_land = world.bob_land;

    let on_alice = world.place(alice_land, POLY_A).unwrap();
    let on_bob = world.place(bob_land, POLY_A).unwrap();
    let other_poly = world.place(alice_land, POLY_B).unwrap();

    let source = |id| world.registry.get_placement(id).unwrap().unwrap().source.id;
    assert_ne!(source(on_alice), source(on_bob));
    assert_ne!(source(on_alice), source(other_poly));

    let bob_entries = world.registry.list_catalog_entries(&world.bob).unwrap();
    assert_eq!(bob_entries.len(), 1);
    assert_eq!(bob_entries[0].owner, world.bob);
}

#[test]
fn placement_payer_is_parcel_owner() {
    let mut world = World::new();
    let bob_land = world.bob_land;
    let id = world.place(bob_land, POLY_A).unwrap();

    let placement = world.registry.get_placement(id).unwrap().unwrap();
    assert_eq!(placement.payer, world.bob);
    assert_eq!(placement.parcel_id, bob_land);
    assert_eq!(placement.transform, transform());
}

#[test]
fn persist_rejects_missing_parcel_bad_poly_id_and_foreign_caller() {
    let mut world = World::new();
    let alice_land = world.alice_land;

    let err = validation(world.place(99, POLY_A).unwrap_err());
    assert_eq!(err, ValidationError::ParcelNotFound(99));

    for poly_id in ["short", "AAAAAAAAAAAA", "", "ééééééééééé"] {
        let err = validation(world.place(alice_land, poly_id).unwrap_err());
        assert_eq!(err, ValidationError::InvalidPolyId(poly_id.to_string()));
    }

    let err = world
        .registry
        .persist_placement(
            &Signers::single(world.bob.clone()),
            &PlacementRequest {
                parcel_id: alice_land,
                poly_id: POLY_A.to_string(),
                transform: transform(),
            },
        )
        .unwrap_err();
    assert_eq!(
        validation(err),
        ValidationError::MissingAuthority(world.alice.clone())
    );

    assert!(world
        .registry
        .list_catalog_entries(&world.alice)
        .unwrap()
        .is_empty());
    assert!(world
        .registry
        .list_placements_for_parcel(alice_land)
        .unwrap()
        .is_empty());
}

#[test]
fn out_of_bounds_geometry_is_rejected() {
    let mut world = World::new();
    let alice_land = world.alice_land;
    let signers = Signers::single(world.alice.clone());

    let cases = [
        (
            Transform {
                position: Vector3::new(0.5, 0.1, 0.5),
                ..transform()
            },
            ValidationError::PositionOutOfBounds,
        ),
        (
            Transform {
                scale: Vector3::new(0.1, 1.0, 1.0),
                ..transform()
            },
            ValidationError::ScaleOutOfBounds,
        ),
        (
            Transform {
                orientation: Vector3::new(0.0, 0.0, 360.0),
                ..transform()
            },
            ValidationError::OrientationOutOfBounds,
        ),
    ];

    for (bad, expected) in cases.clone() {
        let err = world
            .registry
            .persist_placement(
                &signers,
                &PlacementRequest {
                    parcel_id: alice_land,
                    poly_id: POLY_A.to_string(),
                    transform: bad,
                },
            )
            .unwrap_err();
        assert_eq!(validation(err), expected);
    }

    let id = world.place(alice_land, POLY_A).unwrap();
    let err = world
        .registry
        .update_placement(
            &signers,
            id,
            &PlacementUpdate {
                parcel_id: alice_land,
                transform: cases[0].0,
            },
        )
        .unwrap_err();
    assert_eq!(validation(err), ValidationError::PositionOutOfBounds);
}

#[test]
fn moving_to_another_owners_parcel_needs_both_authorities() {
    let mut world = World::new();
    let alice_land = world.alice_land;
    let bob_land = world.bob_land;
    let id = world.place(alice_land, POLY_A).unwrap();

    let update = PlacementUpdate {
        parcel_id: bob_land,
        transform: Transform {
            position: Vector3::new(0.9, 0.0, 0.1),
            ..transform()
        },
    };

    let err = world
        .registry
        .update_placement(&Signers::single(world.alice.clone()), id, &update)
        .unwrap_err();
    assert_eq!(
        validation(err),
        ValidationError::MissingAuthority(world.bob.clone())
    );

    let err = world
        .registry
        .update_placement(&Signers::single(world.bob.clone()), id, &update)
        .unwrap_err();
    assert_eq!(
        validation(err),
        ValidationError::MissingAuthority(world.alice.clone())
    );

    let both = world.signed(&[&world.alice, &world.bob]);
    world.registry.update_placement(&both, id, &update).unwrap();

    let moved = world.registry.get_placement(id).unwrap().unwrap();
    assert_eq!(moved.parcel_id, bob_land);
    assert_eq!(moved.transform, update.transform);
    assert_eq!(moved.payer, world.alice);
    assert_eq!(
        world.registry.list_placements_for_parcel(bob_land).unwrap(),
        vec![moved]
    );
}

#[test]
fn moving_within_own_parcels_needs_only_owner() {
    let mut world = World::new();
    let alice_land = world.alice_land;
    let second_land = world.alice_second_land;
    let id = world.place(alice_land, POLY_A).unwrap();

    world
        .registry
        .update_placement(
            &Signers::single(world.alice.clone()),
            id,
            &PlacementUpdate {
                parcel_id: second_land,
                transform: transform(),
            },
        )
        .unwrap();

    let moved = world.registry.get_placement(id).unwrap().unwrap();
    assert_eq!(moved.parcel_id, second_land);
}

#[test]
fn update_and_delete_reject_unknown_placements_and_strangers() {
    let mut world = World::new();
    let alice_land = world.alice_land;
    let id = world.place(alice_land, POLY_A).unwrap();
    let alice = Signers::single(world.alice.clone());

    let err = world
        .registry
        .update_placement(
            &alice,
            42,
            &PlacementUpdate {
                parcel_id: alice_land,
                transform: transform(),
            },
        )
        .unwrap_err();
    assert_eq!(validation(err), ValidationError::PlacementNotFound(42));

    let err = world.registry.delete_placement(&alice, 42).unwrap_err();
    assert_eq!(validation(err), ValidationError::PlacementNotFound(42));

    let err = world
        .registry
        .update_placement(
            &alice,
            id,
            &PlacementUpdate {
                parcel_id: 77,
                transform: transform(),
            },
        )
        .unwrap_err();
    assert_eq!(validation(err), ValidationError::ParcelNotFound(77));

    let err = world
        .registry
        .delete_placement(&Signers::single(world.bob.clone()), id)
        .unwrap_err();
    assert_eq!(
        validation(err),
        ValidationError::MissingAuthority(world.alice.clone())
    );
    assert!(world.registry.get_placement(id).unwrap().is_some());
    assert!(world.sink.sent().is_empty());
}

#[test]
fn poly_id_length_counts_bytes() {
    let mut world = World::new();
    let alice_land = world.alice_land;

    let ten_chars_eleven_bytes = "abcdefghié";
    let id = world.place(alice_land, ten_chars_eleven_bytes).unwrap();

    let source = world.registry.get_placement(id).unwrap().unwrap().source;
    let entry = world.registry.get_catalog_entry(source.id).unwrap().unwrap();
    assert_eq!(entry.poly_id, ten_chars_eleven_bytes);
}
