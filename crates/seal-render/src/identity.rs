use std::fmt;

use seal_crypto::DesignFingerprint;
use seal_types::SealMetadata;

/// Everything that decides how an item looks.
///
/// Two items with equal identities render identically, so the identity is
/// the geometry-cache key. Build it with [`VisualIdentity::for_item`]; the
/// cache never sees a hand-formatted key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VisualIdentity {
    template: String,
    color: Option<String>,
    fingerprint: Option<DesignFingerprint>,
}

impl VisualIdentity {
    /// Identity of an item rendered from `template_id` with `meta` attributes.
    ///
    /// A design that does not decode renders as no design, and gets the same
    /// identity as an item without one.
    pub fn for_item(template_id: &str, meta: &SealMetadata) -> Self {
        let fingerprint = meta
            .stamp_design
            .as_deref()
            .and_then(|design| DesignFingerprint::of_design_string(design).ok());
        Self {
            template: template_id.to_string(),
            color: meta.wax_color.clone(),
            fingerprint,
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn fingerprint(&self) -> Option<&DesignFingerprint> {
        self.fingerprint.as_ref()
    }

    /// `"{template}-{color or "default"}-{fingerprint or "none"}"`.
    ///
    /// For logs only. Template ids and colors may contain `-`, so distinct
    /// identities can share this text; the cache keys on the identity itself.
    pub fn cache_key(&self) -> String {
        format!(
            "{}-{}-{}",
            self.template,
            self.color.as_deref().unwrap_or("default"),
            self.fingerprint
                .as_ref()
                .map(DesignFingerprint::as_str)
                .unwrap_or("none"),
        )
    }
}

impl fmt::Display for VisualIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}
