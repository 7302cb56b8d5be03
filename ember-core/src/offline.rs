use std::hash::{DefaultHasher, Hash, Hasher};

// Stale-while-revalidate: answer from cache when possible, refresh the entry
// in the background. The cache name changes whenever the page set does, so a
// new deploy invalidates old caches on activate.
const SW_BODY: &str = r#"self.addEventListener('install', function (event) {
  event.waitUntil(
    caches.open(CACHE)
      .then(function (cache) { return cache.addAll(PRECACHE); })
      .then(function () { return self.skipWaiting(); })
  );
});
self.addEventListener('activate', function (event) {
  event.waitUntil(
    caches.keys().then(function (keys) {
      return Promise.all(
        keys.filter(function (key) { return key !== CACHE; })
            .map(function (key) { return caches.delete(key); })
      );
    }).then(function () { return self.clients.claim(); })
  );
});
self.addEventListener('fetch', function (event) {
  if (event.request.method !== 'GET') { return; }
  event.respondWith(
    caches.open(CACHE).then(function (cache) {
      return cache.match(event.request).then(function (cached) {
        var refresh = fetch(event.request).then(function (response) {
          if (response.ok) { cache.put(event.request, response.clone()); }
          return response;
        });
        return cached || refresh;
      });
    })
  );
});
"#;

pub fn cache_name(urls: &[String]) -> String {
    let mut hasher = DefaultHasher::new();
    urls.hash(&mut hasher);
    format!("pages-{:016x}", hasher.finish())
}

pub fn service_worker(urls: &[String]) -> String {
    format!(
        "const CACHE = '{}';\nconst PRECACHE = {};\n{}",
        cache_name(urls),
        serde_json::json!(urls),
        SW_BODY
    )
}

pub fn register_snippet() -> String {
    String::from(
        "<script>\nif ('serviceWorker' in navigator) {\n  window.addEventListener('load', function () {\n    navigator.serviceWorker.register('/sw.js');\n  });\n}\n</script>\n",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precaches_every_page() {
        let urls = vec!["/".to_string(), "/contact/".to_string()];
        let js = service_worker(&urls);
        assert!(js.contains(r#"const PRECACHE = ["/","/contact/"];"#));
        assert!(js.contains("addAll(PRECACHE)"));
    }

    #[test]
    fn cache_name_tracks_the_page_set() {
        let a = vec!["/".to_string()];
        let b = vec!["/".to_string(), "/contact/".to_string()];
        assert_ne!(cache_name(&a), cache_name(&b));
        assert_eq!(cache_name(&a), cache_name(&a));
    }

    #[test]
    fn registration_targets_the_worker_script() {
        assert!(register_snippet().contains("navigator.serviceWorker.register('/sw.js')"));
    }
}
