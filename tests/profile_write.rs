//! Writing values into profile files on disk through the public API.

use std::fs;

use privprofile::ConfigStore;
use privprofile::registry::{Confirm, NativeFileAccess, write_profile_value};

struct Refuse;

impl Confirm for Refuse {
    fn confirm(&self, _title: &str, _message: &str) -> bool {
        false
    }
}

#[test]
fn existing_entries_survive_a_write() {
    let dir = tempfile::tempdir().expect("create temporary directory");
    let path = dir.path().join("SkyrimPrefs.ini");
    fs::write(
        &path,
        "[Display]\r\niSize W=1920\r\niSize H=1080\r\n\r\n[Launcher]\r\nbEnableFileSelection=\"1\"\r\n",
    )
    .expect("write profile");

    write_profile_value("display", "ISIZE W", "2560", &path, &NativeFileAccess, &Refuse)
        .expect("write succeeds");
    write_profile_value("Archive", "bInvalidateOlderFiles", "1", &path, &NativeFileAccess, &Refuse)
        .expect("write succeeds");

    let profile = ConfigStore::from_bytes(&fs::read(&path).expect("read profile"));

    assert_eq!(profile.len(), 3);
    assert_eq!(profile.property_count(), 4);
    assert_eq!(profile.string_property("Display", "iSize W"), Some("2560"));
    assert_eq!(profile.string_property("Display", "iSize H"), Some("1080"));
    assert_eq!(profile.string_property("launcher", "benablefileselection"), Some("1"));
    assert_eq!(profile.string_property("ARCHIVE", "bInvalidateOlderFiles"), Some("1"));

    let names = profile.sections().map(|s| s.name()).collect::<Vec<_>>();
    assert_eq!(names, ["Archive", "Display", "Launcher"]);
}

#[test]
fn saved_profile_reloads_identically() {
    let mut profile = ConfigStore::new();
    profile.set_string_property("General", "sLanguage", "ENGLISH");
    profile.set_string_property("general", "SLANGUAGE", "FRENCH");
    profile.set_string_property("Grass", "iMinGrassSize", "60");

    let mut buffer = Vec::new();
    profile.save(&mut buffer).expect("writing to a Vec cannot fail");
    let reloaded = ConfigStore::from_reader(buffer.as_slice()).expect("slices are readable");

    assert_eq!(reloaded, profile);
    assert_eq!(reloaded.property_count(), 2);
    assert_eq!(reloaded.string_property("GENERAL", "slanguage"), Some("FRENCH"));
}
