//! Basic loading example for archetype_gltf
//!
//! Usage: `cargo run --example basic_loading -- path/to/model.gltf`

use archetype_gltf::{Category, Extensions, GltfDataBuffer, Options, Parser};
use std::path::Path;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let Some(path) = std::env::args().nth(1) else {
        println!("archetype_gltf v{}", archetype_gltf::VERSION);
        println!("usage: basic_loading <model.gltf|model.glb>");
        return Ok(());
    };

    let data = GltfDataBuffer::from_path(&path)?;
    let base_dir = Path::new(&path).parent().unwrap_or(Path::new("."));

    // Act on every extension the crate knows about
    let mut parser = Parser::new(Extensions::all());
    let mut document = parser.load_gltf(&data, base_dir, Options::empty())?;

    // Only what a renderer needs, then check references
    document.parse(Category::ONLY_RENDERABLE)?;
    document.validate()?;

    let asset = document.asset();
    if let Some(info) = &asset.asset_info {
        println!("glTF {} ({})", info.version, info.generator.as_deref().unwrap_or("unknown"));
    }
    println!("Loaded {} meshes", asset.meshes.len());
    println!("Loaded {} materials", asset.materials.len());
    println!("Loaded {} textures", asset.textures.len());
    println!("Loaded {} nodes", asset.nodes.len());
    for (i, buffer) in asset.buffers.iter().enumerate() {
        println!("buffer {i}: {} bytes, {:?}", buffer.byte_length, buffer.data.mime_type());
    }

    println!("Basic loading example complete!");
    Ok(())
}
