//! BDD tests for registering data files.

use auxdata_fetcher::component::{DataFileComponent, DataFileDescriptor};
use auxdata_fetcher::key::{CacheKey, ComponentKind};
use auxdata_fetcher::registry::FileRegistry;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

struct DeclaredReader {
    files: Vec<DataFileDescriptor>,
}

impl DataFileComponent for DeclaredReader {
    fn component_kind(&self) -> ComponentKind {
        ComponentKind::Readers
    }

    fn data_files(&self) -> &[DataFileDescriptor] {
        &self.files
    }
}

#[derive(Default)]
struct RegistryWorld {
    registry: FileRegistry,
    reader: Option<DeclaredReader>,
    last_key: Option<Option<CacheKey>>,
    registered: Vec<CacheKey>,
}

#[fixture]
fn world() -> RegistryWorld {
    RegistryWorld::default()
}

#[given("an empty registry")]
fn given_empty_registry(world: &mut RegistryWorld) {
    world.registry = FileRegistry::new();
}

#[given("a reader declaring \"{first}\" and \"{second}\" renamed to \"{renamed}\"")]
fn given_reader(world: &mut RegistryWorld, first: String, second: String, renamed: String) {
    world.reader = Some(DeclaredReader {
        files: vec![
            DataFileDescriptor::new(first),
            DataFileDescriptor::new(second).with_filename(renamed),
        ],
    });
}

#[given("a reader declaring \"{url}\" both as is and renamed to \"{renamed}\"")]
fn given_reader_with_override(world: &mut RegistryWorld, url: String, renamed: String) {
    world.reader = Some(DeclaredReader {
        files: vec![
            DataFileDescriptor::new(url.clone()),
            DataFileDescriptor::new(url).with_filename(renamed),
        ],
    });
}

#[when("the file \"{url}\" named \"{name}\" is registered for \"{kind}\" with hash \"{hash}\"")]
fn when_registered(world: &mut RegistryWorld, url: String, name: String, kind: String, hash: String) {
    let key = world
        .registry
        .register_file(&url, Some(name.as_str()), Some(kind.as_str()), Some(hash.as_str()));
    world.last_key = Some(key);
}

#[when("the file \"{url}\" is registered without a filename")]
fn when_registered_without_filename(world: &mut RegistryWorld, url: String) {
    let key = world.registry.register_file(&url, None, Some("readers"), None);
    world.last_key = Some(key);
}

#[when("the reader registers its data files")]
fn when_reader_registers(world: &mut RegistryWorld) {
    let reader = world.reader.as_ref().expect("reader declared");
    world.registered = reader
        .register_data_files(&mut world.registry, None)
        .expect("registration succeeds");
}

#[then("the returned key is \"{expected}\"")]
fn then_returned_key(world: &mut RegistryWorld, expected: String) {
    let key = world.last_key.clone().expect("registration attempted");
    assert_eq!(key.as_ref().map(CacheKey::as_str), Some(expected.as_str()));
}

#[then("no key is returned")]
fn then_no_key(world: &mut RegistryWorld) {
    let key = world.last_key.clone().expect("registration attempted");
    assert!(key.is_none(), "unexpected key {key:?}");
}

#[then("the registry is empty")]
fn then_registry_empty(world: &mut RegistryWorld) {
    assert!(world.registry.is_empty());
}

#[then("the registry holds {count:usize} entry")]
fn then_registry_len(world: &mut RegistryWorld, count: usize) {
    assert_eq!(world.registry.len(), count);
}

#[then("the registry holds {count:usize} entries")]
fn then_registry_len_plural(world: &mut RegistryWorld, count: usize) {
    then_registry_len(world, count);
}

#[then("the registry maps \"{key}\" to \"{url}\" with hash \"{hash}\"")]
fn then_registry_maps(world: &mut RegistryWorld, key: String, url: String, hash: String) {
    let entry = world.registry.get(&key).expect("key registered");
    assert_eq!(entry.url(), url);
    assert_eq!(entry.known_hash(), Some(hash.as_str()));
}

#[then("the registry maps \"{key}\" to \"{url}\" without a hash")]
fn then_registry_maps_url(world: &mut RegistryWorld, key: String, url: String) {
    let entry = world.registry.get(&key).expect("key registered");
    assert_eq!(entry.url(), url);
    assert_eq!(entry.known_hash(), None);
}

#[then("the registered keys are \"{keys}\"")]
fn then_registered_keys(world: &mut RegistryWorld, keys: String) {
    let expected: Vec<&str> = keys.split(',').collect();
    let actual: Vec<&str> = world.registered.iter().map(CacheKey::as_str).collect();
    assert_eq!(actual, expected);
}

#[scenario(
    path = "tests/features/registry.feature",
    name = "Registering a reader file namespaces its key"
)]
fn scenario_namespaced_key(world: RegistryWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/registry.feature",
    name = "Registering without a filename is a no-op"
)]
fn scenario_no_filename(world: RegistryWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/registry.feature",
    name = "Registering the same key twice keeps the latest source"
)]
fn scenario_overwrite(world: RegistryWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/registry.feature",
    name = "A reader component registers files derived from its URLs"
)]
fn scenario_component_registration(world: RegistryWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/registry.feature",
    name = "The same URL registered with and without a filename override"
)]
fn scenario_same_url_override(world: RegistryWorld) {
    let _ = world;
}
