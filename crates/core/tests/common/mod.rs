#![allow(dead_code)]

use jarweave_core::{ArchiveMerger, MergeConfig};
use jarweave_java::fixture::ClassFixture;
use jarweave_java::{ClassFieldScanner, ConstantFieldInjector};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use zip::write::SimpleFileOptions;

pub const ROUTE_HOLDER: &str = "a/RouterMap__TheRouter__app.class";
pub const SERVICE_HOLDER: &str = "a/ServiceProvider__TheRouter__app.class";
pub const INJECTOR: &str = "com/therouter/TheRouterServiceProvideInjecter.class";

pub fn merger(config: MergeConfig) -> ArchiveMerger {
    let rules = config.holder_rules().unwrap();
    let injector = ConstantFieldInjector::from_rules(&rules);
    ArchiveMerger::new(
        config,
        Arc::new(ClassFieldScanner::new(rules)),
        Arc::new(injector),
    )
    .unwrap()
}

pub fn write_jar(path: &Path, entries: &[(&str, Vec<u8>)]) {
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, bytes) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options).unwrap();
        } else {
            zip.start_file(*name, options).unwrap();
            zip.write_all(bytes).unwrap();
        }
    }
    zip.finish().unwrap();
}

pub fn read_jar(path: &Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).unwrap();
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes).unwrap();
            (entry.name().to_string(), bytes)
        })
        .collect()
}

pub fn names(entries: &[(String, Vec<u8>)]) -> Vec<&str> {
    entries.iter().map(|(name, _)| name.as_str()).collect()
}

pub fn route_holder(value: &str) -> Vec<u8> {
    ClassFixture::new("a/RouterMap__TheRouter__app")
        .string_constant("ROUTERMAP", value)
        .to_bytes()
}

pub fn service_holder(json: &str) -> Vec<u8> {
    ClassFixture::new("a/ServiceProvider__TheRouter__app")
        .string_constant("FLOW_TASK_JSON", json)
        .to_bytes()
}

pub fn injector(tag: &str) -> Vec<u8> {
    ClassFixture::new("com/therouter/TheRouterServiceProvideInjecter")
        .string_constant("TAG", tag)
        .to_bytes()
}
