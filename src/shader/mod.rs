//! Shader Template Library
//!
//! WGSL sources for the deferred programs live in `src/shaders` as minijinja
//! templates and are specialised per [`GBufferLayout`]: the geometry pass
//! declares one fragment output per target, the lighting pass one texture
//! binding per target.
//!
//! Templates use custom delimiters so that they stay readable as WGSL:
//!
//! | Syntax            | Meaning                     |
//! |-------------------|-----------------------------|
//! | `{$ ... $}`       | block tag (`if`, `for`)     |
//! | `{{ ... }}`       | expression                  |
//! | `$$ ...`          | line statement              |
//! | `{$ include "x" $}` | inlines `chunks/x.wgsl`   |
//!
//! Compiled modules are cached by the xxh3-128 hash of the final source.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use minijinja::syntax::SyntaxConfig;
use minijinja::{Environment, Error, ErrorKind};
use rust_embed::RustEmbed;
use rustc_hash::FxHashMap;
use serde::Serialize;
use xxhash_rust::xxh3::xxh3_128;

use crate::errors::Result;
use crate::gbuffer::{GBufferLayout, GBufferTarget};
use crate::light::MAX_LIGHTS;

static SHADER_ENV: OnceLock<Environment<'static>> = OnceLock::new();

#[derive(RustEmbed)]
#[folder = "src/shaders"]
struct ShaderAssets;

fn environment() -> &'static Environment<'static> {
    SHADER_ENV.get_or_init(|| {
        let mut env = Environment::new();

        match SyntaxConfig::builder()
            .block_delimiters("{$", "$}")
            .variable_delimiters("{{", "}}")
            .line_statement_prefix("$$")
            .build()
        {
            Ok(syntax) => env.set_syntax(syntax),
            Err(e) => log::error!("Invalid shader template syntax: {e}"),
        }

        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_undefined_behavior(minijinja::UndefinedBehavior::SemiStrict);
        env.set_loader(shader_loader);
        env.set_path_join_callback(|name, _parent| format!("chunks/{name}").into());

        env
    })
}

fn shader_loader(name: &str) -> std::result::Result<Option<String>, Error> {
    let filename = if std::path::Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wgsl"))
    {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{name}.wgsl"))
    };

    // Debug builds prefer the on-disk file so shaders can be edited without
    // rebuilding the embedded assets.
    #[cfg(debug_assertions)]
    {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("src/shaders")
            .join(filename.as_ref());
        if path.exists() {
            return std::fs::read_to_string(&path).map(Some).map_err(|e| {
                Error::new(
                    ErrorKind::TemplateNotFound,
                    format!("Failed to read {}: {e}", path.display()),
                )
            });
        }
    }

    if let Some(file) = ShaderAssets::get(&filename)
        && let Ok(source) = std::str::from_utf8(file.data.as_ref())
    {
        return Ok(Some(source.to_string()));
    }

    Ok(None)
}

/// Ordered set of `#define`-style flags passed to templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShaderDefines(BTreeMap<String, String>);

impl ShaderDefines {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// A G-buffer target as seen by the templates.
#[derive(Debug, Clone, Serialize)]
pub struct TargetBinding {
    /// WGSL identifier (`normal`, `albedo`, ...)
    pub name: &'static str,
    /// Fragment output location in the geometry pass; equal to the texture
    /// binding in the lighting pass.
    pub location: u32,
}

/// Values available to every deferred shader template.
#[derive(Debug, Clone, Serialize)]
pub struct ShaderContext {
    pub targets: Vec<TargetBinding>,
    pub depth_binding: u32,
    pub max_lights: usize,
    pub defines: ShaderDefines,
}

impl ShaderContext {
    /// Builds the context for `layout`, adding a `HAS_<TARGET>` define for
    /// each target present.
    #[must_use]
    pub fn for_layout(layout: &GBufferLayout, mut defines: ShaderDefines) -> Self {
        let targets = layout
            .targets()
            .iter()
            .enumerate()
            .map(|(location, desc)| TargetBinding {
                name: desc.target.wgsl_name(),
                location: location as u32,
            })
            .collect();

        for target in GBufferTarget::ALL {
            if layout.contains(target) {
                defines.set(format!("HAS_{}", target.wgsl_name().to_uppercase()), "1");
            }
        }

        Self {
            targets,
            depth_binding: layout.depth_binding(),
            max_lights: MAX_LIGHTS,
            defines,
        }
    }
}

/// Template renderer and shader module cache.
pub struct ShaderLibrary {
    module_cache: FxHashMap<u128, wgpu::ShaderModule>,
}

impl Default for ShaderLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self {
            module_cache: FxHashMap::default(),
        }
    }

    /// Renders `template` to WGSL without touching the GPU.
    pub fn render(template: &str, ctx: &ShaderContext) -> Result<String> {
        let template = environment().get_template(template)?;
        Ok(template.render(ctx)?)
    }

    /// Renders `template` and returns its compiled module, reusing a cached
    /// module when the generated source is identical.
    ///
    /// Returns `(module, source_hash)`.
    pub fn get_or_compile(
        &mut self,
        device: &wgpu::Device,
        template: &str,
        ctx: &ShaderContext,
    ) -> Result<(&wgpu::ShaderModule, u128)> {
        let source = Self::render(template, ctx)?;
        let hash = xxh3_128(source.as_bytes());

        let module = self.module_cache.entry(hash).or_insert_with(|| {
            log::debug!("Compiling shader module '{template}' ({hash:032x})");
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(template),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        });

        Ok((module, hash))
    }

    #[must_use]
    pub fn module_count(&self) -> usize {
        self.module_cache.len()
    }
}
