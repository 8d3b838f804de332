/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g. `"seal-design-v1"`) that is
/// prepended to every hash computation, so identical bytes hashed for two
/// different purposes never collide.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for packed stamp designs.
    pub const DESIGN: Self = Self {
        domain: "seal-design-v1",
    };

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        *hasher.finalize().as_bytes()
    }
}
