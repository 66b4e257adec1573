pub mod archive;
pub mod cache;
pub mod cleanup;
pub mod commands;
pub mod fetch;
pub mod http;
pub mod output;
pub mod repository;
pub mod resolve;
pub mod runtime;

/// Fixtures shared by unit tests across modules.
#[cfg(test)]
pub mod test_utils {
    use crate::repository::{Arch, PackageRecord, RepositoryIndex};
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    pub const BASE_URL: &str = "http://repo.example/windows:/mingw:/win32/openSUSE_13.2/";

    /// A noarch record located at `noarch/<filename>`.
    pub fn record(
        name: &str,
        build_time: i64,
        filename: &str,
        provides: &[&str],
        requires: &[&str],
    ) -> PackageRecord {
        PackageRecord {
            name: name.to_string(),
            build_time,
            location: format!("noarch/{}", filename),
            arch: Arch::Noarch.as_str().to_string(),
            provides: provides.iter().map(|s| s.to_string()).collect(),
            requires: requires.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Like [`record`], with the filename `<name>-<build_time>.noarch.rpm`.
    pub fn pkg(name: &str, build_time: i64, provides: &[&str], requires: &[&str]) -> PackageRecord {
        let filename = format!("{}-{}.noarch.rpm", name, build_time);
        record(name, build_time, &filename, provides, requires)
    }

    pub fn index_from(records: Vec<PackageRecord>) -> RepositoryIndex {
        RepositoryIndex::build(records, BASE_URL, Arch::Noarch)
    }

    pub fn repomd_xml(primary_href: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<repomd xmlns="http://linux.duke.edu/metadata/repo" xmlns:rpm="http://linux.duke.edu/metadata/rpm">
  <revision>1418646000</revision>
  <data type="primary">
    <checksum type="sha256">abc</checksum>
    <location href="{}"/>
  </data>
  <data type="filelists">
    <location href="repodata/def-filelists.xml.gz"/>
  </data>
</repomd>"#,
            primary_href
        )
    }

    pub fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    /// Two noarch packages (libpng needs zlib) and the zlib source package.
    pub const PRIMARY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata xmlns="http://linux.duke.edu/metadata/common" xmlns:rpm="http://linux.duke.edu/metadata/rpm" packages="3">
<package type="rpm">
  <name>mingw32-zlib</name>
  <arch>noarch</arch>
  <time file="1418640001" build="1418640000"/>
  <location href="noarch/mingw32-zlib-1.2.8-1.noarch.rpm"/>
  <format>
    <rpm:provides>
      <rpm:entry name="mingw32(zlib1.dll)"/>
      <rpm:entry name="mingw32-zlib" flags="EQ" epoch="0" ver="1.2.8" rel="1"/>
    </rpm:provides>
  </format>
</package>
<package type="rpm">
  <name>mingw32-libpng</name>
  <arch>noarch</arch>
  <time file="1418645001" build="1418645000"/>
  <location href="noarch/mingw32-libpng-1.6.10-1.noarch.rpm"/>
  <format>
    <rpm:provides>
      <rpm:entry name="mingw32(libpng16-16.dll)"/>
      <rpm:entry name="mingw32-libpng" flags="EQ" epoch="0" ver="1.6.10" rel="1"/>
    </rpm:provides>
    <rpm:requires>
      <rpm:entry name="mingw32(zlib1.dll)"/>
    </rpm:requires>
  </format>
</package>
<package type="rpm">
  <name>mingw32-zlib</name>
  <arch>src</arch>
  <time file="1418640001" build="1418640000"/>
  <location href="src/mingw32-zlib-1.2.8-1.src.rpm"/>
  <format>
    <rpm:requires>
      <rpm:entry name="mingw32-filesystem"/>
    </rpm:requires>
  </format>
</package>
</metadata>"#;
}
