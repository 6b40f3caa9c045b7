//! Container loading and category parsing
//!
//! [`Parser::load_gltf`] detects JSON vs GLB framing, reads the document
//! header and negotiates extensions. The returned [`Document`] then
//! materializes the asset one [`Category`] mask at a time.

mod buffers;
mod data_buffer;
pub mod gltf;
mod glb;
pub(crate) mod materials;
mod meshes;
mod scene;
mod textures;

pub use data_buffer::{DataOrigin, GltfDataBuffer};

use crate::alloc::BufferAllocator;
use crate::error::{Error, Result};
use crate::extensions::{self, lights, HookContext};
use crate::json::{structural, JsonObject};
use crate::model::{Asset, AssetInfo};
use crate::options::{Category, Extensions, Options};
use crate::source::Resolver;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Loads glTF and GLB documents
///
/// The parser keeps the error of its most recent [`load_gltf`](Self::load_gltf)
/// call, including extension negotiation failures that still produce a
/// [`Document`].
#[derive(Debug, Default)]
pub struct Parser {
    extensions: Extensions,
    allocator: Option<Arc<dyn BufferAllocator>>,
    error: Option<Error>,
}

impl Parser {
    /// Create a parser that acts on the given extensions
    pub fn new(extensions: Extensions) -> Self {
        Self {
            extensions,
            allocator: None,
            error: None,
        }
    }

    /// Hand decoded payloads to `allocator` instead of owning them
    pub fn with_allocator(mut self, allocator: Arc<dyn BufferAllocator>) -> Self {
        self.allocator = Some(allocator);
        self
    }

    pub fn extensions(&self) -> Extensions {
        self.extensions
    }

    /// Error recorded by the last `load_gltf` call
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Load a document from `data`
    ///
    /// `base_dir` is the directory relative URIs are resolved against; it
    /// is never read. Fails on I/O, framing, JSON and header errors. A
    /// missing or unknown required extension is not a load failure: the
    /// document is returned, [`error`](Self::error) reports the problem and
    /// every [`Document::parse`] call returns it.
    pub fn load_gltf(
        &mut self,
        data: &GltfDataBuffer,
        base_dir: impl AsRef<Path>,
        options: Options,
    ) -> Result<Document> {
        self.error = None;
        let result = self.load(data, base_dir.as_ref(), options);
        match &result {
            Ok(document) => self.error = document.negotiation_error.clone(),
            Err(err) => {
                log::warn!("Failed to load glTF: {err}");
                self.error = Some(err.clone());
            }
        }
        result
    }

    fn load(&self, data: &GltfDataBuffer, base_dir: &Path, options: Options) -> Result<Document> {
        if base_dir.is_file() {
            return Err(Error::InvalidPath(base_dir.to_path_buf()));
        }

        let bytes = data.as_bytes();
        let (json_bytes, glb_bin) = if glb::is_glb(bytes) {
            let chunks = glb::split(bytes)?;
            (chunks.json, chunks.bin.map(<[u8]>::to_vec))
        } else {
            log::debug!("Loading JSON glTF ({} bytes)", bytes.len());
            (bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes), None)
        };

        let json: Value =
            serde_json::from_slice(json_bytes).map_err(|e| Error::InvalidJson(e.to_string()))?;
        let root = JsonObject::new(&json, "")
            .map_err(|_| structural("document root", "must be an object"))?;

        let asset_info = read_asset_info(&root, options)?;
        let extensions_used = root.string_vec("extensionsUsed")?;
        let extensions_required = root.string_vec("extensionsRequired")?;
        let negotiation_error = self.negotiate(&extensions_used, &extensions_required);

        let asset = Asset {
            asset_info,
            extensions_used,
            extensions_required,
            enabled: self.extensions,
            ..Default::default()
        };

        Ok(Document {
            json,
            glb_bin,
            base_dir: base_dir.to_path_buf(),
            options,
            enabled: self.extensions,
            allocator: self.allocator.clone(),
            negotiation_error,
            state: DocumentState::Loaded,
            asset,
        })
    }

    /// Check the document's extension lists against the enabled set
    fn negotiate(&self, used: &[String], required: &[String]) -> Option<Error> {
        for name in used {
            match extensions::extension_flag(name) {
                Some(flag) if !self.extensions.contains(flag) => {
                    log::warn!("Extension {name} is used by the document but not enabled")
                }
                Some(_) => log::debug!("Extension {name} enabled"),
                None => log::debug!("Extension {name} is not supported and will be ignored"),
            }
        }

        if let Some(unknown) = required
            .iter()
            .find(|name| extensions::extension_flag(name).is_none())
        {
            return Some(Error::UnknownRequiredExtension(unknown.clone()));
        }

        let missing: Vec<String> = required
            .iter()
            .filter(|name| {
                extensions::extension_flag(name).is_some_and(|flag| !self.extensions.contains(flag))
            })
            .cloned()
            .collect();
        if missing.is_empty() {
            None
        } else {
            Some(Error::MissingExtensions(missing))
        }
    }
}

fn read_asset_info(root: &JsonObject<'_>, options: Options) -> Result<Option<AssetInfo>> {
    let lenient = options.contains(Options::DONT_REQUIRE_VALID_ASSET_MEMBER);
    let info = root
        .child("asset")
        .ok()
        .flatten()
        .and_then(|asset| {
            Some(AssetInfo {
                version: asset.str("version").ok()??.to_string(),
                min_version: asset.string("minVersion").ok()?,
                generator: asset.string("generator").ok()?,
                copyright: asset.string("copyright").ok()?,
            })
        });

    let Some(info) = info else {
        if lenient {
            log::debug!("Document has no valid asset object; continuing");
            return Ok(None);
        }
        return Err(Error::InvalidOrMissingAssetField);
    };

    if !is_version_2(&info.version) {
        return Err(Error::UnsupportedVersion(info.version));
    }
    if let Some(min) = &info.min_version {
        if min != "2.0" {
            return Err(Error::UnsupportedVersion(min.clone()));
        }
    }
    log::debug!(
        "glTF {} (generator: {})",
        info.version,
        info.generator.as_deref().unwrap_or("unknown")
    );
    Ok(Some(info))
}

fn is_version_2(version: &str) -> bool {
    matches!(version.split_once('.'), Some(("2", minor)) if minor.parse::<u32>().is_ok())
}

/// Lifecycle of a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Header read, nothing parsed yet
    Loaded,
    /// At least one category parsed; the mask is cumulative
    PartiallyParsed(Category),
    /// Validation passed for the categories in the mask
    Validated(Category),
}

/// A loaded document whose categories are parsed on demand
#[derive(Debug)]
pub struct Document {
    json: Value,
    glb_bin: Option<Vec<u8>>,
    base_dir: PathBuf,
    options: Options,
    enabled: Extensions,
    allocator: Option<Arc<dyn BufferAllocator>>,
    negotiation_error: Option<Error>,
    state: DocumentState,
    asset: Asset,
}

/// Inputs shared by every category sub-parser
pub(crate) struct ParseContext<'a> {
    pub root: JsonObject<'a>,
    pub hooks: HookContext,
    pub resolver: Resolver<'a>,
    pub glb_bin: Option<&'a [u8]>,
    pub options: Options,
}

impl<'a> ParseContext<'a> {
    /// Objects of the category's top-level array; empty when the key is absent
    pub fn elements(&self, category: Category) -> Result<Vec<JsonObject<'a>>> {
        match category.json_key() {
            Some(key) => self.root.child_array(key),
            None => Ok(Vec::new()),
        }
    }
}

impl Document {
    /// Parse the categories in `mask`
    ///
    /// Categories run in canonical order and replace earlier results for
    /// the same category. On error, categories completed earlier in this
    /// call and in previous calls are kept.
    pub fn parse(&mut self, mask: Category) -> Result<()> {
        if let Some(err) = &self.negotiation_error {
            return Err(err.clone());
        }

        let mask = mask.with_dependencies(self.enabled);
        let ctx = ParseContext {
            root: JsonObject::new(&self.json, "")?,
            hooks: HookContext {
                enabled: self.enabled,
            },
            resolver: Resolver {
                base_dir: &self.base_dir,
                enabled: self.enabled,
                allocator: self.allocator.as_deref(),
            },
            glb_bin: self.glb_bin.as_deref(),
            options: self.options,
        };

        for category in Category::CANONICAL_ORDER {
            if !mask.contains(category) {
                continue;
            }
            let mut staged = Asset::default();
            let count = parse_category(&ctx, category, &mut staged).map_err(|err| {
                log::warn!("Parsing {category:?} failed: {err}");
                err
            })?;
            self.asset.take_category(&mut staged, category);
            log::debug!("Parsed {count} {}", category_label(category));
        }

        let parsed = self.asset.parsed;
        self.state = DocumentState::PartiallyParsed(parsed);
        Ok(())
    }

    /// Validate the parsed asset; see [`crate::validate`]
    pub fn validate(&mut self) -> Result<()> {
        crate::validate::validate(&self.asset)?;
        self.state = DocumentState::Validated(self.asset.parsed);
        Ok(())
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Extension negotiation failure recorded at load time
    pub fn negotiation_error(&self) -> Option<&Error> {
        self.negotiation_error.as_ref()
    }

    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    pub fn asset_mut(&mut self) -> &mut Asset {
        &mut self.asset
    }

    /// Take ownership of the parsed asset
    pub fn into_asset(self) -> Asset {
        self.asset
    }
}

/// Run one category's sub-parser into `staged`, returning the entity count
fn parse_category(ctx: &ParseContext<'_>, category: Category, staged: &mut Asset) -> Result<usize> {
    let count = if category == Category::BUFFERS {
        staged.buffers = buffers::parse_buffers(ctx)?;
        staged.buffers.len()
    } else if category == Category::BUFFER_VIEWS {
        staged.buffer_views = buffers::parse_buffer_views(ctx)?;
        staged.buffer_views.len()
    } else if category == Category::ACCESSORS {
        staged.accessors = buffers::parse_accessors(ctx)?;
        staged.accessors.len()
    } else if category == Category::IMAGES {
        staged.images = textures::parse_images(ctx)?;
        staged.images.len()
    } else if category == Category::SAMPLERS {
        staged.samplers = textures::parse_samplers(ctx)?;
        staged.samplers.len()
    } else if category == Category::TEXTURES {
        staged.textures = textures::parse_textures(ctx)?;
        staged.textures.len()
    } else if category == Category::MATERIALS {
        staged.materials = materials::parse_materials(ctx)?;
        staged.materials.len()
    } else if category == Category::MESHES {
        staged.meshes = meshes::parse_meshes(ctx)?;
        staged.meshes.len()
    } else if category == Category::SKINS {
        staged.skins = meshes::parse_skins(ctx)?;
        staged.skins.len()
    } else if category == Category::CAMERAS {
        staged.cameras = scene::parse_cameras(ctx)?;
        staged.cameras.len()
    } else if category == Category::LIGHTS {
        if ctx.hooks.enabled.contains(Extensions::KHR_LIGHTS_PUNCTUAL) {
            staged.lights = lights::parse_lights(&ctx.root)?;
        }
        staged.lights.len()
    } else if category == Category::ANIMATIONS {
        staged.animations = scene::parse_animations(ctx)?;
        staged.animations.len()
    } else if category == Category::NODES {
        staged.nodes = scene::parse_nodes(ctx)?;
        staged.nodes.len()
    } else if category == Category::SCENES {
        let (scenes, default_scene) = scene::parse_scenes(ctx)?;
        staged.scenes = scenes;
        staged.default_scene = default_scene;
        staged.scenes.len()
    } else {
        0
    };
    Ok(count)
}

fn category_label(category: Category) -> &'static str {
    category.json_key().unwrap_or("lights")
}
