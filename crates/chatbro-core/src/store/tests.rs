
    use super::*;
    use async_trait::async_trait;
    use chatbro_llm::Message;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Codec(&'static str);

    impl SessionCodec for Codec {
        fn owner(&self) -> &str {
            self.0
        }
    }

    /// Backend whose every call fails
    #[derive(Default)]
    struct BrokenBackend {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SessionBackend for BrokenBackend {
        fn name(&self) -> &str {
            "broken"
        }

        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::Store("connection refused".to_string()))
        }

        async fn set_with_ttl(&self, _key: &str, _value: &[u8], _ttl: Duration) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::Store("connection refused".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::Store("connection refused".to_string()))
        }
    }

    fn memory_store() -> (SessionStore, MemoryBackend) {
        let backend = MemoryBackend::new();
        (SessionStore::new(Arc::new(backend.clone())), backend)
    }

    #[tokio::test]
    async fn test_save_then_get() {
        let (store, _) = memory_store();
        let cancel = CancellationToken::new();
        let codec = Codec("restaurants");

        let mut session = AgentSession::new();
        session.messages.push(Message::user("Hello"));

        assert!(store.try_save("u1::restaurants", &codec, &session, &cancel).await);
        let loaded = store.get("u1::restaurants", &codec, &cancel).await;
        assert_eq!(loaded, session);
    }

    #[tokio::test]
    async fn test_get_missing_is_fresh() {
        let (store, _) = memory_store();
        let session = store
            .get("nobody", &Codec("orchestrator"), &CancellationToken::new())
            .await;
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_get_corrupt_blob_is_fresh() {
        let (store, backend) = memory_store();
        backend
            .set_with_ttl("u1", b"{ not json", Duration::from_secs(60))
            .await
            .unwrap();

        let session = store
            .get("u1", &Codec("orchestrator"), &CancellationToken::new())
            .await;
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_get_foreign_blob_is_fresh() {
        let (store, _) = memory_store();
        let cancel = CancellationToken::new();

        let mut session = AgentSession::new();
        session.messages.push(Message::user("Hello"));
        store.try_save("u1", &Codec("documents"), &session, &cancel).await;

        let loaded = store.get("u1", &Codec("orchestrator"), &cancel).await;
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn test_backend_failures() {
        let backend = Arc::new(BrokenBackend::default());
        let store = SessionStore::new(backend.clone());
        let cancel = CancellationToken::new();
        let codec = Codec("orchestrator");

        assert!(store.get("u1", &codec, &cancel).await.is_empty());
        assert!(!store.try_save("u1", &codec, &AgentSession::new(), &cancel).await);
        assert!(matches!(
            store.must_delete("u1", &cancel).await,
            Err(Error::Store(_))
        ));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_cancelled_calls_do_not_reach_backend() {
        let backend = Arc::new(BrokenBackend::default());
        let store = SessionStore::new(backend.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let codec = Codec("orchestrator");

        assert!(store.get("u1", &codec, &cancel).await.is_empty());
        assert!(!store.try_save("u1", &codec, &AgentSession::new(), &cancel).await);
        assert!(matches!(
            store.must_delete("u1", &cancel).await,
            Err(Error::Cancelled)
        ));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_must_delete_reports_removal() {
        let (store, backend) = memory_store();
        let cancel = CancellationToken::new();

        assert!(!store.must_delete("u1", &cancel).await.unwrap());

        store
            .try_save("u1", &Codec("orchestrator"), &AgentSession::new(), &cancel)
            .await;
        assert!(backend.contains("u1").await);
        assert!(store.must_delete("u1", &cancel).await.unwrap());
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_out_of_range_ttl_fails_the_save() {
        let backend = MemoryBackend::new();
        let store = SessionStore::new(Arc::new(backend.clone()))
            .with_ttl(Duration::from_secs(u64::MAX));
        let mut session = AgentSession::new();
        session.messages.push(Message::user("Hello"));

        let saved = store
            .try_save("u1", &Codec("orchestrator"), &session, &CancellationToken::new())
            .await;

        assert!(!saved);
        assert!(backend.is_empty().await);
        assert!(matches!(
            backend.set_with_ttl("u1", b"x", Duration::MAX).await,
            Err(Error::Store(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_read_keeps_a_fresh_write() {
        let backend = MemoryBackend::new();
        backend
            .set_with_ttl("u1", b"old", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_millis(20)).await;

        assert!(backend.get("u1").await.unwrap().is_none());
        backend
            .set_with_ttl("u1", b"new", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(backend.get("u1").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_backend_expires_entries() {
        let backend = MemoryBackend::new();
        backend
            .set_with_ttl("short", b"x", Duration::from_millis(20))
            .await
            .unwrap();
        backend
            .set_with_ttl("long", b"y", Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_millis(50)).await;

        assert!(backend.get("short").await.unwrap().is_none());
        assert!(!backend.delete("short").await.unwrap());
        assert_eq!(backend.keys().await, vec!["long".to_string()]);
    }
