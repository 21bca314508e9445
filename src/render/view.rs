use anyhow::{anyhow, Context};
use minijinja::Environment;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// The view layer: renders a named view with request attributes.
pub trait ViewRenderer: Send + Sync {
    fn render(&self, view: &str, attributes: &Map<String, Value>) -> anyhow::Result<String>;
}

enum TemplateSource {
    Dir(PathBuf),
    Memory(HashMap<String, String>),
}

/// [`ViewRenderer`] backed by MiniJinja templates.
///
/// Views are looked up as files below a base directory, or in an in-memory
/// set. Templates whose name ends in `.html` are auto-escaped.
pub struct MiniJinjaViews {
    source: TemplateSource,
}

impl MiniJinjaViews {
    pub fn from_dir<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            source: TemplateSource::Dir(base.into()),
        }
    }

    pub fn from_templates<I, K, V>(templates: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            source: TemplateSource::Memory(
                templates
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn map_path(base: &Path, view: &str) -> Option<PathBuf> {
        let mut pb = base.to_path_buf();
        for comp in Path::new(view.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }

    fn load(&self, view: &str) -> anyhow::Result<String> {
        match &self.source {
            TemplateSource::Dir(base) => {
                let path = Self::map_path(base, view)
                    .ok_or_else(|| anyhow!("invalid view path `{view}`"))?;
                fs::read_to_string(&path)
                    .with_context(|| format!("cannot read view `{}`", path.display()))
            }
            TemplateSource::Memory(templates) => templates
                .get(view.trim_start_matches('/'))
                .cloned()
                .ok_or_else(|| anyhow!("unknown view `{view}`")),
        }
    }
}

impl ViewRenderer for MiniJinjaViews {
    fn render(&self, view: &str, attributes: &Map<String, Value>) -> anyhow::Result<String> {
        let source = self.load(view)?;
        let name = view.trim_start_matches('/');
        let mut env = Environment::new();
        env.add_template(name, &source)?;
        let tmpl = env.get_template(name)?;
        Ok(tmpl.render(attributes)?)
    }
}
