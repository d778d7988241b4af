//! Generación de `sitemap.xml` con las carpetas navegables más cercanas a la raíz.

use url::Url;

use crate::{catalog::Catalog, codec, models::NodeIdx};

/// Profundidad máxima (raíz = 1) de las carpetas que se publican.
pub const MAX_SITEMAP_DEPTH: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub priority: f32,
}

fn depth_priority(depth: usize) -> f32 {
    let p = (0.8 - depth as f32 * 0.1).max(0.4);
    (p * 100.0).round() / 100.0
}

fn join(site: &Url, path: &str) -> String {
    format!("{}{}", site.as_str().trim_end_matches('/'), path)
}

/// Portada, listado raíz y carpetas hasta `MAX_SITEMAP_DEPTH`, en preorden.
pub fn entries(catalog: &Catalog, site: &Url) -> Vec<SitemapEntry> {
    let mut out = vec![
        SitemapEntry { loc: join(site, "/"), priority: 1.0 },
        SitemapEntry { loc: join(site, "/browse"), priority: 0.9 },
    ];

    let index = catalog.index();
    let mut stack: Vec<(NodeIdx, Vec<String>, usize)> = index
        .roots()
        .iter()
        .rev()
        .map(|idx| (*idx, Vec::new(), 1))
        .collect();

    while let Some((idx, mut path, depth)) = stack.pop() {
        let node = index.node(idx);
        if depth > MAX_SITEMAP_DEPTH || !node.is_folder() {
            continue;
        }
        let Some(segment) = codec::segment_of(node) else {
            continue;
        };
        path.push(segment);
        out.push(SitemapEntry {
            loc: join(site, &format!("/browse{}", codec::href(&path))),
            priority: depth_priority(depth),
        });
        for child in node.children().iter().rev() {
            stack.push((*child, path.clone(), depth + 1));
        }
    }

    out
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn render(catalog: &Catalog, site: &Url) -> String {
    let lastmod = catalog.loaded_at().format("%Y-%m-%d");
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries(catalog, site) {
        xml.push_str(&format!(
            "  <url><loc>{}</loc><lastmod>{lastmod}</lastmod><priority>{:.1}</priority></url>\n",
            escape_xml(&entry.loc),
            entry.priority
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}
