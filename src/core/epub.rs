use crate::core::markup::{parse_document, Element};
use crate::domain::model::TocEntry;
use crate::domain::ports::EntrySource;
use crate::utils::error::{ReaderError, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

pub const CONTAINER_PATH: &str = "META-INF/container.xml";
const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";
const UNTITLED: &str = "Untitled";

/// An EPUB opened as a zip archive.
pub struct EpubArchive<R: Read + Seek = File> {
    archive: ZipArchive<R>,
}

/// True when `path` is an existing regular file ending in `.epub` (any case).
pub fn check_epub(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("epub"))
}

impl EpubArchive<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !check_epub(path) {
            return Err(ReaderError::NotAnEpub {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Opening EPUB archive: {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(file)
    }
}

impl<R: Read + Seek> EpubArchive<R> {
    pub fn from_reader(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        tracing::debug!("Archive holds {} entries", archive.len());
        Ok(Self { archive })
    }

    pub fn table_of_contents(&mut self) -> Result<Vec<TocEntry>> {
        table_of_contents(self)
    }
}

impl<R: Read + Seek> EntrySource for EpubArchive<R> {
    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => {
                return Err(ReaderError::EntryNotFound {
                    name: name.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data)?;
        Ok(data)
    }
}

/// Directory part of an archive path, with a trailing slash; empty at the root.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "",
    }
}

/// Resolve `href` against `base_dir` the way archive member names are laid
/// out: fragments and queries are dropped, `.` and `..` segments collapsed.
pub fn resolve_href(base_dir: &str, href: &str) -> String {
    let href = href.split(['#', '?']).next().unwrap_or("").trim();
    if href.is_empty() {
        return String::new();
    }

    let joined = match href.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("{}{}", base_dir, href),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Book title first, then one entry per spine document in reading order.
pub fn table_of_contents<S: EntrySource + ?Sized>(source: &mut S) -> Result<Vec<TocEntry>> {
    let container = parse_document(&source.read_entry(CONTAINER_PATH)?)?;
    let opf_path = container
        .find("rootfile")
        .and_then(|rootfile| rootfile.attr("full-path"))
        .map(str::to_string)
        .ok_or_else(|| ReaderError::MalformedPackage {
            message: format!("{} has no rootfile full-path", CONTAINER_PATH),
        })?;

    let basedir = parent_dir(&opf_path).to_string();
    tracing::debug!("Package document: {} (basedir '{}')", opf_path, basedir);

    let package = parse_document(&source.read_entry(&opf_path)?)?;
    let title = package
        .find("metadata")
        .and_then(|metadata| metadata.find("title"))
        .or_else(|| package.find("title"))
        .map(|title| title.text().trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    let manifest = Manifest::from_package(&package, &basedir);
    let spine = spine_order(&package, &manifest)?;

    let labels = if let Some(ncx) = &manifest.ncx {
        let document = parse_document(&source.read_entry(ncx)?)?;
        ncx_labels(&document, parent_dir(ncx))
    } else if let Some(nav) = &manifest.nav {
        let document = parse_document(&source.read_entry(nav)?)?;
        nav_labels(&document, parent_dir(nav))
    } else {
        tracing::debug!("No NCX or nav document; chapters stay untitled");
        HashMap::new()
    };

    let mut entries = Vec::with_capacity(spine.len() + 1);
    entries.push(TocEntry::new(title, None));
    for section in spine {
        let label = labels.get(&section).cloned().unwrap_or_default();
        entries.push(TocEntry::new(label, Some(section.trim().to_string())));
    }

    tracing::debug!("Table of contents has {} entries", entries.len());
    Ok(entries)
}

struct Manifest {
    items: HashMap<String, String>,
    ncx: Option<String>,
    nav: Option<String>,
}

impl Manifest {
    fn from_package(package: &Element, basedir: &str) -> Self {
        let mut items = HashMap::new();
        let mut ncx = None;
        let mut nav = None;

        if let Some(manifest) = package.find("manifest") {
            for item in manifest.find_all("item") {
                let (Some(id), Some(href)) = (item.attr("id"), item.attr("href")) else {
                    continue;
                };
                let path = format!("{}{}", basedir, href);

                if item.attr("media-type") == Some(NCX_MEDIA_TYPE) {
                    ncx = Some(path.clone());
                }
                let is_nav = item
                    .attr("properties")
                    .is_some_and(|props| props.split_whitespace().any(|p| p == "nav"));
                if is_nav && nav.is_none() {
                    nav = Some(path.clone());
                }

                items.insert(id.to_string(), path);
            }
        }

        Self { items, ncx, nav }
    }
}

fn spine_order(package: &Element, manifest: &Manifest) -> Result<Vec<String>> {
    let Some(spine) = package.find("spine") else {
        return Ok(Vec::new());
    };

    spine
        .find_all("itemref")
        .into_iter()
        .filter_map(|itemref| itemref.attr("idref"))
        .map(|idref| {
            manifest
                .items
                .get(idref)
                .cloned()
                .ok_or_else(|| ReaderError::MalformedPackage {
                    message: format!("spine references unknown manifest id '{}'", idref),
                })
        })
        .collect()
}

fn insert_label(labels: &mut HashMap<String, String>, base_dir: &str, src: &str, label: String) {
    let path = resolve_href(base_dir, src);
    if !path.is_empty() {
        // a document's own entry precedes its sub-sections
        labels.entry(path).or_insert(label);
    }
}

fn ncx_labels(document: &Element, base_dir: &str) -> HashMap<String, String> {
    let mut labels = HashMap::new();
    for navpoint in document.find_all("navpoint") {
        let Some(src) = navpoint.find("content").and_then(|content| content.attr("src")) else {
            continue;
        };
        let label = navpoint
            .find("navlabel")
            .map(|label| label.text().trim().to_string())
            .unwrap_or_default();
        insert_label(&mut labels, base_dir, src, label);
    }
    labels
}

fn nav_labels(document: &Element, base_dir: &str) -> HashMap<String, String> {
    let navs = document.find_all("nav");
    let toc_nav = navs
        .iter()
        .find(|nav| nav.attr("type") == Some("toc"))
        .or_else(|| navs.first());

    let mut labels = HashMap::new();
    if let Some(nav) = toc_nav {
        for link in nav.find_all("a") {
            if let Some(href) = link.attr("href") {
                let label = link.text().split_whitespace().collect::<Vec<_>>().join(" ");
                insert_label(&mut labels, base_dir, href, label);
            }
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MapSource(HashMap<String, Vec<u8>>);

    impl MapSource {
        fn new(files: &[(&str, &str)]) -> Self {
            Self(
                files
                    .iter()
                    .map(|(name, body)| (name.to_string(), body.as_bytes().to_vec()))
                    .collect(),
            )
        }
    }

    impl EntrySource for MapSource {
        fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
            self.0.get(name).cloned().ok_or_else(|| ReaderError::EntryNotFound {
                name: name.to_string(),
            })
        }
    }

    const CONTAINER: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles><rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/></rootfiles>
</container>"#;

    const OPF: &str = r#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>The Book</dc:title></metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
    <item id="c2" href="text/ch2.xhtml" media-type="application/xhtml+xml"/>
    <item id="c1" href="text/ch1.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine toc="ncx"><itemref idref="c1"/><itemref idref="c2"/></spine>
</package>"#;

    const NCX: &str = r#"<?xml version="1.0"?>
<ncx><navMap>
  <navPoint id="n1"><navLabel><text> Chapter One </text></navLabel><content src="text/ch1.xhtml"/>
    <navPoint id="n1a"><navLabel><text>Section</text></navLabel><content src="text/ch1.xhtml#s1"/></navPoint>
  </navPoint>
</navMap></ncx>"#;

    #[test]
    fn test_resolve_href() {
        assert_eq!(resolve_href("OEBPS/", "text/ch1.xhtml#top"), "OEBPS/text/ch1.xhtml");
        assert_eq!(resolve_href("OEBPS/text/", "../images/a.png"), "OEBPS/images/a.png");
        assert_eq!(resolve_href("", "./ch1.xhtml"), "ch1.xhtml");
        assert_eq!(resolve_href("OEBPS/", "/cover.xhtml"), "cover.xhtml");
        assert_eq!(resolve_href("OEBPS/", "#only-anchor"), "");
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("OEBPS/content.opf"), "OEBPS/");
        assert_eq!(parent_dir("content.opf"), "");
    }

    #[test]
    fn test_toc_follows_spine_and_ncx_titles() {
        let mut source = MapSource::new(&[
            (CONTAINER_PATH, CONTAINER),
            ("OEBPS/content.opf", OPF),
            ("OEBPS/toc.ncx", NCX),
        ]);

        let toc = table_of_contents(&mut source).unwrap();

        assert_eq!(
            toc,
            vec![
                TocEntry::new("The Book", None),
                TocEntry::new("Chapter One", Some("OEBPS/text/ch1.xhtml".to_string())),
                TocEntry::new("", Some("OEBPS/text/ch2.xhtml".to_string())),
            ]
        );
    }

    #[test]
    fn test_unknown_spine_idref_is_malformed() {
        let opf = OPF.replace(r#"idref="c2""#, r#"idref="missing""#);
        let mut source = MapSource::new(&[
            (CONTAINER_PATH, CONTAINER),
            ("OEBPS/content.opf", &opf),
            ("OEBPS/toc.ncx", NCX),
        ]);

        let err = table_of_contents(&mut source).unwrap_err();
        assert!(matches!(err, ReaderError::MalformedPackage { .. }));
    }

    #[test]
    fn test_missing_container_is_entry_not_found() {
        let mut source = MapSource::new(&[]);
        let err = table_of_contents(&mut source).unwrap_err();
        assert!(matches!(err, ReaderError::EntryNotFound { ref name } if name == CONTAINER_PATH));
    }

    #[test]
    fn test_epub3_nav_document_provides_titles() {
        let container = CONTAINER.replace("OEBPS/content.opf", "package.opf");
        let opf = r#"<package version="3.0"><metadata><dc:title>Nav Book</dc:title></metadata>
<manifest>
  <item id="nav" href="nav.xhtml" properties="nav" media-type="application/xhtml+xml"/>
  <item id="a" href="a.xhtml" media-type="application/xhtml+xml"/>
</manifest>
<spine><itemref idref="a"/></spine></package>"#;
        let nav = r#"<html><body>
<nav epub:type="landmarks"><ol><li><a href="a.xhtml">Start</a></li></ol></nav>
<nav epub:type="toc"><ol><li><a href="a.xhtml#x">First
  Part</a></li></ol></nav></body></html>"#;
        let mut source = MapSource::new(&[
            (CONTAINER_PATH, &container),
            ("package.opf", opf),
            ("nav.xhtml", nav),
        ]);

        let toc = table_of_contents(&mut source).unwrap();
        assert_eq!(toc[0].title, "Nav Book");
        assert_eq!(toc[1], TocEntry::new("First Part", Some("a.xhtml".to_string())));
    }

    #[test]
    fn test_missing_title_falls_back() {
        let opf = OPF.replace("<dc:title>The Book</dc:title>", "");
        let mut source = MapSource::new(&[
            (CONTAINER_PATH, CONTAINER),
            ("OEBPS/content.opf", &opf),
            ("OEBPS/toc.ncx", NCX),
        ]);

        let toc = table_of_contents(&mut source).unwrap();
        assert_eq!(toc[0].title, UNTITLED);
    }
}
