//! Allow-list sanitizer for untrusted email HTML.
//!
//! The document is parsed into a detached tree, walked in pre-order, and
//! serialized back. Elements outside the tag allow-list are dropped with
//! their subtree; attributes outside the attribute allow-list are dropped;
//! the survivors are rewritten so the result can be embedded inline without
//! running script, clobbering the host page's globals, or overlaying it.

use std::collections::HashSet;

use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use markup5ever_rcdom::{Handle, SerializableHandle};

use super::css::StyleDeclarations;
use super::dom;
use crate::constants::NS_PREFIX;

const TAG_ALLOW_LIST: &[&str] = &[
    // Document structure
    "html", "body", "head",
    // HTML
    "a", "abbr", "acronym", "address", "area", "b", "basefont", "bdo", "big", "blockquote", "br",
    "caption", "center", "cite", "code", "col", "colgroup", "dd", "del", "dfn", "dir", "div", "dl",
    "dt", "em", "fieldset", "font", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i", "ins", "label",
    "legend", "li", "map", "menu", "nobr", "ol", "p", "pre", "q", "s", "samp", "small", "span",
    "strike", "strong", "sub", "sup", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "tt",
    "u", "ul", "var", "wbr", "img", "video", "source",
    // Forms
    "button", "input", "textarea", "select", "option", "optgroup",
    // SVG
    "svg", "altglyph", "altglyphdef", "altglyphitem", "animate", "animatecolor",
    "animatetransform", "circle", "clippath", "defs", "desc", "ellipse", "g", "glyph", "glyphref",
    "hkern", "image", "line", "lineargradient", "marker", "mask", "mpath", "path", "pattern",
    "polygon", "polyline", "radialgradient", "rect", "set", "stop", "switch", "symbol", "text",
    "textpath", "tref", "tspan", "use", "view", "vkern", "filter",
    // SVG filters
    "feblend", "fecolormatrix", "fecomponenttransfer", "fecomposite", "feconvolvematrix",
    "fediffuselighting", "fedisplacementmap", "feflood", "fefunca", "fefuncb", "fefuncg",
    "fefuncr", "fegaussianblur", "feimage", "femerge", "femergenode", "femorphology", "feoffset",
    "fespecularlighting", "fetile", "feturbulence",
    // MathML
    "math", "menclose", "merror", "mfenced", "mfrac", "mglyph", "mi", "mlabeledtr",
    "mmuliscripts", "mn", "mo", "mover", "mpadded", "mphantom", "mroot", "mrow", "ms", "mspace",
    "msqrt", "mstyle", "msub", "msup", "msubsup", "mtable", "mtd", "mtext", "mtr", "munder",
    "munderover", "maligngroup", "malignmark", "mprescripts", "semantics", "annotation",
    "annotation-xml", "none", "infinity", "matrix", "matrixrow", "ci", "cn", "sep", "apply",
    "plus", "minus", "eq", "power", "times", "divide", "csymbol", "root", "bvar", "lowlimit",
    "uplimit",
];

const ATTRIBUTE_ALLOW_LIST: &[&str] = &[
    // Rewritten below
    "name", "id", "class", "style",
    // HTML
    "title", "alt", "width", "height", "align", "nowrap", "col", "row", "rowspan", "colspan",
    "cellspacing", "cellpadding", "valign", "bgcolor", "color", "border", "bordercolorlight",
    "bordercolordark", "face", "marginwidth", "marginheight", "axis", "abbr", "char", "charoff",
    "clear", "compact", "coords", "vspace", "hspace", "cellborder", "size", "lang", "dir",
    "usemap", "shape", "media", "background", "src", "poster", "href", "rel",
    // Forms
    "type", "rows", "cols", "disabled", "readonly", "checked", "multiple", "value",
    // SVG
    "accent-height", "accumulate", "additive", "alignment-baseline", "alphabetic", "ascent",
    "attributename", "attributetype", "azimuth", "basefrequency", "baseprofile",
    "baseline-shift", "begin", "bias", "by", "clip", "clip-path", "clip-rule",
    "color-interpolation", "color-interpolation-filters", "color-profile", "color-rendering",
    "cx", "cy", "d", "dx", "dy", "diffuseconstant", "direction", "display", "divisor", "dur",
    "edgemode", "elevation", "end", "fill", "fill-opacity", "fill-rule", "filter", "flood-color",
    "flood-opacity", "font-family", "font-size", "font-size-adjust", "font-stretch",
    "font-style", "font-variant", "font-weight", "from", "fx", "fy", "g1", "g2", "glyph-name",
    "glyphref", "gradientunits", "gradienttransform", "image-rendering", "in", "in2", "k", "k1",
    "k2", "k3", "k4", "kerning", "keypoints", "keysplines", "keytimes", "lengthadjust",
    "letter-spacing", "kernelmatrix", "kernelunitlength", "lighting-color", "local",
    "marker-end", "marker-mid", "marker-start", "markerheight", "markerunits", "markerwidth",
    "maskcontentunits", "maskunits", "max", "mask", "mode", "min", "numoctaves", "offset",
    "operator", "opacity", "order", "orient", "orientation", "origin", "overflow", "paint-order",
    "path", "pathlength", "patterncontentunits", "patterntransform", "patternunits", "points",
    "preservealpha", "r", "rx", "ry", "radius", "refx", "refy", "repeatcount", "repeatdur",
    "restart", "rotate", "scale", "seed", "shape-rendering", "show", "specularconstant",
    "specularexponent", "spreadmethod", "stddeviation", "stitchtiles", "stop-color",
    "stop-opacity", "stroke-dasharray", "stroke-dashoffset", "stroke-linecap", "stroke-linejoin",
    "stroke-miterlimit", "stroke-opacity", "stroke", "stroke-width", "surfacescale", "targetx",
    "targety", "transform", "text-anchor", "text-decoration", "text-rendering", "textlength",
    "to", "u1", "u2", "unicode", "values", "viewbox", "visibility", "vert-adv-y", "version",
    "vert-origin-x", "vert-origin-y", "word-spacing", "wrap", "writing-mode",
    "xchannelselector", "ychannelselector", "x", "x1", "x2", "xmlns", "y", "y1", "y2", "z",
    "zoomandpan",
    // MathML
    "accent", "accentunder", "bevelled", "close", "columnalign", "columnlines", "columnspan",
    "denomalign", "depth", "displaystyle", "encoding", "fence", "frame", "largeop", "length",
    "linethickness", "lspace", "lquote", "mathbackground", "mathcolor", "mathsize",
    "mathvariant", "maxsize", "minsize", "movablelimits", "notation", "numalign", "open",
    "rowalign", "rowlines", "rowspacing", "rspace", "rquote", "scriptlevel", "scriptminsize",
    "scriptsizemultiplier", "selection", "separator", "separators", "stretchy",
    "subscriptshift", "supscriptshift", "symmetric", "voffset", "fontsize", "fontweight",
    "fontstyle", "fontfamily", "groupalign", "edge", "side",
];

const PROTOCOL_ALLOW_LIST: &[&str] = &["http", "https", "ftp", "mailto"];

/// Presentation attributes that accept CSS `url(...)` references.
const URL_VALUED_ATTRIBUTES: &[&str] = &[
    "fill",
    "filter",
    "stroke",
    "marker-start",
    "marker-end",
    "marker-mid",
    "clip-path",
    "mask",
    "cursor",
];

fn to_set(list: &[&str]) -> HashSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Allow-lists and namespacing used by a [`Sanitizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizePolicy {
    /// Lowercase tag names kept in the tree
    pub tag_allow_list: HashSet<String>,
    /// Lowercase attribute names kept on elements
    pub attribute_allow_list: HashSet<String>,
    /// URL schemes accepted in `href`/`src`, matched case-sensitively
    pub protocol_allow_list: HashSet<String>,
    /// Prepended to every `id`, `name` and class token
    pub ns_prefix: String,
    /// Leave `<!-- ... -->` notes where content was removed
    pub annotate: bool,
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        Self {
            tag_allow_list: to_set(TAG_ALLOW_LIST),
            attribute_allow_list: to_set(ATTRIBUTE_ALLOW_LIST),
            protocol_allow_list: to_set(PROTOCOL_ALLOW_LIST),
            ns_prefix: NS_PREFIX.to_string(),
            annotate: true,
        }
    }
}

impl SanitizePolicy {
    pub fn allow_protocol(mut self, protocol: &str) -> Self {
        self.protocol_allow_list.insert(protocol.to_string());
        self
    }

    pub fn with_ns_prefix(mut self, prefix: &str) -> Self {
        self.ns_prefix = prefix.to_string();
        self
    }

    pub fn with_annotations(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }
}

/// Post-processes URLs that passed the scheme check.
///
/// This is where a caller that allowed a custom scheme (such as `cid`) turns
/// it into something the renderer can fetch. Returning `None` rejects the URL.
pub trait UrlRewriter {
    fn rewrite(&self, url: String) -> Option<String>;
}

/// Accepts every URL unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepUrls;

impl UrlRewriter for KeepUrls {
    fn rewrite(&self, url: String) -> Option<String> {
        Some(url)
    }
}

impl<F> UrlRewriter for F
where
    F: Fn(String) -> Option<String>,
{
    fn rewrite(&self, url: String) -> Option<String> {
        self(url)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sanitizer<R = KeepUrls> {
    policy: SanitizePolicy,
    rewriter: R,
}

impl Sanitizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: UrlRewriter> Sanitizer<R> {
    pub fn with_policy(policy: SanitizePolicy, rewriter: R) -> Self {
        Self { policy, rewriter }
    }

    /// Replaces the URL post-processing step, keeping the policy.
    pub fn with_rewriter<R2: UrlRewriter>(self, rewriter: R2) -> Sanitizer<R2> {
        Sanitizer {
            policy: self.policy,
            rewriter,
        }
    }

    pub fn policy(&self) -> &SanitizePolicy {
        &self.policy
    }

    /// Validates a URL for use in `href` or `src`.
    ///
    /// Fragment links are namespaced like ids, `data:image/` URLs pass, and
    /// anything else needs an allow-listed scheme. Accepted URLs go through
    /// the rewriter.
    pub fn sanitize_url(&self, url: &str) -> Option<String> {
        let accepted = if let Some(anchor) = url.strip_prefix('#') {
            format!("#{}{}", self.policy.ns_prefix, anchor)
        } else if url.starts_with("data:image/") {
            url.to_string()
        } else {
            let protocol = url_scheme(url)?;
            if !self.policy.protocol_allow_list.contains(protocol) {
                return None;
            }
            url.to_string()
        };
        self.rewriter.rewrite(accepted)
    }

    /// Returns markup safe to embed: the sanitized head content followed by
    /// the sanitized body content.
    pub fn sanitize(&self, html: &str) -> String {
        let document = dom::parse(html);
        let Some(root) = dom::document_element(&document.document) else {
            return String::new();
        };
        self.sanitize_tree(&root);

        // The root itself may have been rejected by a narrowed policy.
        let Some(root) = dom::document_element(&document.document) else {
            return String::new();
        };
        let mut out = String::new();
        for section in ["head", "body"] {
            if let Some(node) = dom::child_by_tag(&root, section) {
                out.push_str(&serialize_children(&node));
            }
        }
        out
    }

    /// Pre-order walk with an explicit stack; mail bodies can nest deeply.
    fn sanitize_tree(&self, root: &Handle) {
        let mut stack = vec![root.clone()];
        while let Some(element) = stack.pop() {
            if !self.sanitize_element(&element) {
                continue;
            }
            stack.extend(dom::children(&element).into_iter().rev());
        }
    }

    /// Returns false when the element was removed.
    fn sanitize_element(&self, element: &Handle) -> bool {
        let Some(tag) = dom::tag_name(element) else {
            return false;
        };
        if !self.policy.tag_allow_list.contains(&tag) {
            self.note(element, format!("tag {} ignored", tag));
            dom::remove(element);
            return false;
        }
        self.sanitize_attributes(element);
        true
    }

    fn sanitize_attributes(&self, element: &Handle) {
        // Drop everything off the allow-list first so rewrites below (such
        // as adding `target`) are not undone by a later removal.
        let mut kept = Vec::new();
        for (name, value) in dom::attributes(element) {
            let key = name.to_ascii_lowercase();
            if self.policy.attribute_allow_list.contains(&key) {
                kept.push((name, key, value));
            } else {
                self.note(element, format!("attribute {} ignored", name));
                dom::remove_attribute(element, &name);
            }
        }

        let prefix = &self.policy.ns_prefix;
        for (name, key, value) in kept {
            match key.as_str() {
                "id" | "name" => dom::set_attribute(element, &name, &format!("{prefix}{value}")),
                "class" => {
                    let classes = value
                        .split(' ')
                        .map(|token| format!("{prefix}{token}"))
                        .collect::<Vec<_>>()
                        .join(" ");
                    dom::set_attribute(element, &name, &classes);
                }
                "href" => match self.sanitize_url(&value) {
                    Some(href) => {
                        if href.starts_with('#') {
                            dom::remove_attribute(element, "target");
                        } else {
                            dom::set_attribute(element, "target", "_blank");
                        }
                        dom::set_attribute(element, &name, &href);
                    }
                    None => {
                        self.note(element, format!("url {} ignored", value));
                        dom::remove_attribute(element, &name);
                        dom::remove_attribute(element, "target");
                    }
                },
                "src" => {
                    let src = self.sanitize_url(&value).unwrap_or_else(|| {
                        self.note(element, format!("url {} ignored", value));
                        String::new()
                    });
                    dom::set_attribute(element, &name, &src);
                }
                "style" => self.sanitize_style(element, &name, &value),
                key if URL_VALUED_ATTRIBUTES.contains(&key) => {
                    if value.to_ascii_lowercase().contains("url") {
                        self.note(element, format!("attribute {} may load a url", name));
                        dom::remove_attribute(element, &name);
                    }
                }
                _ => {}
            }
        }
    }

    fn sanitize_style(&self, element: &Handle, name: &str, raw: &str) {
        if !dom::is_html_element(element) {
            self.note(element, "attribute style ignored".to_string());
            dom::remove_attribute(element, name);
            return;
        }

        let mut style = StyleDeclarations::parse(raw);
        let mentions_url = raw.to_ascii_lowercase().contains("url")
            || style.iter().any(|d| d.plain.contains("url"));
        let mut fix_position = false;
        let mut to_remove = Vec::new();

        for decl in style.iter() {
            if decl.name == "position" && decl.plain.contains("fixed") {
                fix_position = true;
                break;
            }
            if decl.plain.contains("behavior") || decl.plain.contains("expression") {
                to_remove.push(decl.name.clone());
                break;
            }
            if mentions_url {
                to_remove.push(decl.name.clone());
            }
        }

        if fix_position {
            style.set("position", "absolute");
        }
        if !to_remove.is_empty() {
            for property in &to_remove {
                style.remove(property);
            }
            self.note(element, format!("style {} ignored", to_remove.join(", ")));
        }

        // Always the re-serialized declarations, never the raw text
        if style.is_empty() {
            dom::remove_attribute(element, name);
        } else {
            dom::set_attribute(element, name, &style.to_css_text());
        }
    }

    fn note(&self, element: &Handle, message: String) {
        tracing::debug!("sanitize: {}", message);
        if !self.policy.annotate {
            return;
        }
        if let Some(parent) = dom::parent(element) {
            dom::insert_before(&parent, dom::create_comment(&comment_text(&message)), element);
        }
    }
}

/// Leading `scheme` of `scheme:rest`, if any.
fn url_scheme(url: &str) -> Option<&str> {
    let end = url
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-')))
        .unwrap_or(url.len());
    if end == 0 || !url[end..].starts_with(':') {
        return None;
    }
    Some(&url[..end])
}

/// Comment data is serialized verbatim, so attacker-supplied text must not
/// be able to close the comment.
fn comment_text(message: &str) -> String {
    message
        .replace("--", "- -")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn serialize_children(node: &Handle) -> String {
    let mut bytes = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    };
    if let Err(e) = serialize(&mut bytes, &SerializableHandle::from(node.clone()), opts) {
        tracing::warn!("Failed to serialize sanitized markup: {}", e);
        return String::new();
    }
    String::from_utf8_lossy(&bytes).into_owned()
}
