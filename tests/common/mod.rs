#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::io::Write;
use std::path::{Path, PathBuf};
use threepub::adapters::terminal::fit_width;
use threepub::core::{KeyInput, Launcher, LineStyle, Screen};
use threepub::{ReaderError, Result};
use zip::write::{FileOptions, ZipWriter};

pub const CONTAINER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

pub const OPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>A Short Voyage</dc:title>
  </metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
    <item id="cover" href="cover.xhtml" media-type="application/xhtml+xml"/>
    <item id="ch1" href="text/ch1.xhtml" media-type="application/xhtml+xml"/>
    <item id="ch2" href="text/ch2.xhtml" media-type="application/xhtml+xml"/>
    <item id="whale" href="images/whale.png" media-type="image/png"/>
  </manifest>
  <spine toc="ncx">
    <itemref idref="cover"/>
    <itemref idref="ch1"/>
    <itemref idref="ch2"/>
  </spine>
</package>"#;

pub const NCX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <docTitle><text>A Short Voyage</text></docTitle>
  <navMap>
    <navPoint id="np1" playOrder="1">
      <navLabel><text>Loomings</text></navLabel>
      <content src="text/ch1.xhtml"/>
    </navPoint>
    <navPoint id="np2" playOrder="2">
      <navLabel><text>The Carpet-Bag</text></navLabel>
      <content src="text/ch2.xhtml#start"/>
    </navPoint>
  </navMap>
</ncx>"#;

pub const COVER: &str = r#"<html xmlns="http://www.w3.org/1999/xhtml"><head><title>Cover</title></head>
<body><p>A SHORT VOYAGE</p></body></html>"#;

pub const CH1: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>Loomings</title><style>p { margin: 0 }</style></head>
<body>
<h1>Loomings</h1>
<p>Call me Ishmael. Some years ago &#8212; never mind how long precisely &#8212; having little money.</p>
<p><img src="../images/whale.png" alt="The whale"/></p>
<p>It is a way I have of driving off the spleen.</p>
</body></html>"#;

pub const CH2: &str = r#"<html><body>
<p>I stuffed a shirt or two into my old carpet-bag.</p>
<p><img src="../images/missing.png" alt="Lost"/></p>
</body></html>"#;

pub fn standard_book() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("mimetype", b"application/epub+zip".to_vec()),
        ("META-INF/container.xml", CONTAINER.as_bytes().to_vec()),
        ("OEBPS/content.opf", OPF.as_bytes().to_vec()),
        ("OEBPS/toc.ncx", NCX.as_bytes().to_vec()),
        ("OEBPS/cover.xhtml", COVER.as_bytes().to_vec()),
        ("OEBPS/text/ch1.xhtml", CH1.as_bytes().to_vec()),
        ("OEBPS/text/ch2.xhtml", CH2.as_bytes().to_vec()),
        ("OEBPS/images/whale.png", b"\x89PNG fake whale".to_vec()),
    ]
}

/// Write a zip archive with the given members and return its path.
pub fn build_epub(dir: &Path, name: &str, files: &[(&str, Vec<u8>)]) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).unwrap();
    let mut zip = ZipWriter::new(file);

    for (member, data) in files {
        zip.start_file::<_, ()>(*member, FileOptions::default()).unwrap();
        zip.write_all(data).unwrap();
    }

    zip.finish().unwrap();
    path
}

/// A screen that replays scripted keys and records what was on it at each key press.
///
/// Lines are cut to `cols - 1` characters like on a real terminal.
pub struct ScriptedScreen {
    pub rows: usize,
    pub cols: usize,
    keys: VecDeque<KeyInput>,
    resizes: Vec<(usize, usize, usize)>,
    current: BTreeMap<usize, (String, LineStyle)>,
    pub frames: Vec<BTreeMap<usize, (String, LineStyle)>>,
    pub cursor_rows: Vec<usize>,
    cursor_row: usize,
    pub cursor_visible: bool,
}

impl ScriptedScreen {
    pub fn new(rows: usize, cols: usize, keys: Vec<KeyInput>) -> Self {
        Self {
            rows,
            cols,
            keys: keys.into(),
            resizes: Vec::new(),
            current: BTreeMap::new(),
            frames: Vec::new(),
            cursor_rows: Vec::new(),
            cursor_row: 0,
            cursor_visible: true,
        }
    }

    /// Change the size to `rows` x `cols` once key `key_index` has been read.
    pub fn resize_after(mut self, key_index: usize, rows: usize, cols: usize) -> Self {
        self.resizes.push((key_index, rows, cols));
        self
    }

    pub fn frame_text(&self, index: usize) -> Vec<String> {
        self.frames[index].values().map(|(text, _)| text.clone()).collect()
    }

    pub fn last_frame_text(&self) -> Vec<String> {
        self.frame_text(self.frames.len() - 1)
    }
}

impl Screen for ScriptedScreen {
    fn size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn clear(&mut self) -> Result<()> {
        self.current.clear();
        Ok(())
    }

    fn put_line(&mut self, row: usize, text: &str, style: LineStyle) -> Result<()> {
        let text = fit_width(text, self.cols.saturating_sub(1));
        self.current.insert(row, (text, style));
        Ok(())
    }

    fn place_cursor(&mut self, row: usize) -> Result<()> {
        self.cursor_row = row;
        Ok(())
    }

    fn set_cursor_visible(&mut self, visible: bool) -> Result<()> {
        self.cursor_visible = visible;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_key(&mut self) -> Result<KeyInput> {
        self.frames.push(self.current.clone());
        self.cursor_rows.push(self.cursor_row);

        let key_index = self.frames.len() - 1;
        if let Some(&(_, rows, cols)) = self.resizes.iter().find(|(at, _, _)| *at == key_index) {
            self.rows = rows;
            self.cols = cols;
        }
        Ok(self.keys.pop_front().unwrap_or(KeyInput::Interrupt))
    }
}

#[derive(Default)]
pub struct RecordingLauncher {
    pub images: Vec<(String, Vec<u8>)>,
    pub edits: Vec<Vec<u8>>,
    pub edit_result: Option<Vec<u8>>,
    pub fail_images: bool,
}

impl Launcher for RecordingLauncher {
    fn show_image(&mut self, name: &str, data: &[u8]) -> Result<()> {
        if self.fail_images {
            return Err(ReaderError::ExternalProgram {
                program: "viewer".to_string(),
                message: "exited with 1".to_string(),
            });
        }
        self.images.push((name.to_string(), data.to_vec()));
        Ok(())
    }

    fn edit(&mut self, content: &[u8]) -> Result<Option<Vec<u8>>> {
        self.edits.push(content.to_vec());
        Ok(self.edit_result.clone())
    }
}
