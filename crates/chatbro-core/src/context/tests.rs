
    use super::*;
    use chatbro_llm::MockProvider;
    use std::collections::HashMap;

    fn source_with(files: &[(&str, &str)]) -> Arc<dyn InstructionsSource> {
        let files: HashMap<PathBuf, String> = files
            .iter()
            .map(|(p, t)| (PathBuf::from(p), t.to_string()))
            .collect();

        let mut source = MockInstructionsSource::new();
        source.expect_read_text().returning(move |path| {
            files.get(path).cloned().ok_or_else(|| Error::Instructions {
                path: path.to_path_buf(),
                message: "file not found".to_string(),
            })
        });
        Arc::new(source)
    }

    fn location_provider(llm: &MockProvider) -> ContextProvider {
        ContextProvider::location(
            source_with(&[("restaurants.md", "Find lunch places.")]),
            "restaurants.md",
            LocationExtractor::new(Arc::new(llm.clone()), "test-model"),
        )
    }

    #[tokio::test]
    async fn test_static_injects_instructions() {
        let provider =
            ContextProvider::static_instructions(source_with(&[("a.md", "Be brief.")]), "a.md");

        provider.preflight().await.unwrap();
        let messages = provider.invoking(&AgentSession::new()).await.unwrap();

        assert_eq!(messages, vec![Message::system("Be brief.")]);
        assert_eq!(provider.kind(), "static");
    }

    #[tokio::test]
    async fn test_missing_or_empty_instructions_fail() {
        let source = source_with(&[("empty.md", "  \n")]);

        let missing = ContextProvider::static_instructions(source.clone(), "missing.md");
        assert!(matches!(
            missing.preflight().await,
            Err(Error::Instructions { .. })
        ));

        let empty = ContextProvider::static_instructions(source, "empty.md");
        let err = empty.invoking(&AgentSession::new()).await.unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[tokio::test]
    async fn test_orchestrator_aggregates_descriptions() {
        let source = source_with(&[
            ("orchestrator.md", "Route requests.\n\n<agent-descriptions-here>\n"),
            ("restaurants/description.md", "Lunch menus nearby.\n"),
            ("documents/description.md", "Searches scanned documents."),
        ]);
        let provider = ContextProvider::orchestrator(
            source,
            "orchestrator.md",
            vec![
                RoutingEntry {
                    tool_name: "restaurants_agent".to_string(),
                    description_path: PathBuf::from("restaurants/description.md"),
                },
                RoutingEntry {
                    tool_name: "weather_agent".to_string(),
                    description_path: PathBuf::from("weather/description.md"),
                },
                RoutingEntry {
                    tool_name: "documents_agent".to_string(),
                    description_path: PathBuf::from("documents/description.md"),
                },
            ],
        );

        provider.preflight().await.unwrap();
        let messages = provider.invoking(&AgentSession::new()).await.unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0].content,
            "Route requests.\n\n## restaurants_agent\nLunch menus nearby.\n\n## documents_agent\nSearches scanned documents.\n"
        );
    }

    #[tokio::test]
    async fn test_location_unset_asks_for_coordinates() {
        let provider = location_provider(&MockProvider::new());

        let messages = provider.invoking(&AgentSession::new()).await.unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "Find lunch places.");
        assert_eq!(messages[1].content, ASK_FOR_LOCATION);
    }

    #[tokio::test]
    async fn test_location_set_injects_fact() {
        let provider = location_provider(&MockProvider::new());
        let mut session = AgentSession::new();
        LocationSlot::Set(UserLocation::new(60.17, 24.83).unwrap())
            .store(&mut session)
            .unwrap();

        let messages = provider.invoking(&session).await.unwrap();

        assert!(messages[1].content.contains("latitude 60.17"));
        assert!(messages[1].content.contains("longitude 24.83"));
        assert!(!messages.iter().any(|m| m.content == ASK_FOR_LOCATION));
    }

    #[tokio::test]
    async fn test_invoked_extracts_location() {
        let llm = MockProvider::new();
        llm.add_completion("```json\n{\"latitude\": 60.17, \"longitude\": 24.83}\n```");
        let provider = location_provider(&llm);
        let mut session = AgentSession::new();

        provider
            .invoked(
                &mut session,
                &[Message::user("I'm at 60.17,24.83"), Message::assistant("Thanks!")],
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(
            LocationSlot::load(&session),
            LocationSlot::Set(UserLocation {
                latitude: 60.17,
                longitude: 24.83
            })
        );
        let request = &llm.requests()[0];
        assert!(request.messages[0].content.contains("Extract the user's location"));
        assert_eq!(request.messages[1], Message::user("I'm at 60.17,24.83"));
        assert_eq!(request.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_invoked_ignores_null_island() {
        let llm = MockProvider::new();
        llm.add_completion("{\"latitude\": 0.0, \"longitude\": 0.0}");
        let provider = location_provider(&llm);
        let mut session = AgentSession::new();

        provider
            .invoked(&mut session, &[Message::user("hello")], &CancellationToken::new())
            .await;

        assert_eq!(LocationSlot::load(&session), LocationSlot::Unset);
        assert!(session.state.is_empty());
    }

    #[tokio::test]
    async fn test_invoked_tolerates_bad_extraction() {
        let llm = MockProvider::new();
        llm.add_completion("I could not find any coordinates");
        let provider = location_provider(&llm);
        let mut session = AgentSession::new();

        provider
            .invoked(&mut session, &[Message::user("hello")], &CancellationToken::new())
            .await;

        assert_eq!(LocationSlot::load(&session), LocationSlot::Unset);
    }

    #[tokio::test]
    async fn test_invoked_skips_without_user_message_or_when_set() {
        let llm = MockProvider::new();
        let provider = location_provider(&llm);
        let cancel = CancellationToken::new();

        let mut session = AgentSession::new();
        provider
            .invoked(&mut session, &[Message::assistant("Where are you?")], &cancel)
            .await;

        LocationSlot::Set(UserLocation::new(1.0, 2.0).unwrap())
            .store(&mut session)
            .unwrap();
        provider
            .invoked(&mut session, &[Message::user("I moved to 3,4")], &cancel)
            .await;

        assert!(llm.requests().is_empty());
        assert_eq!(
            LocationSlot::load(&session),
            LocationSlot::Set(UserLocation {
                latitude: 1.0,
                longitude: 2.0
            })
        );
    }

    #[tokio::test]
    async fn test_static_invoked_is_noop() {
        let llm = MockProvider::new();
        let provider =
            ContextProvider::static_instructions(source_with(&[("a.md", "x")]), "a.md");
        let mut session = AgentSession::new();

        provider
            .invoked(&mut session, &[Message::user("60,24")], &CancellationToken::new())
            .await;

        assert!(session.state.is_empty());
        assert!(llm.requests().is_empty());
    }

    #[test]
    fn test_user_location_validation() {
        assert!(UserLocation::new(60.17, 24.83).is_some());
        assert!(UserLocation::new(-90.0, 180.0).is_some());
        assert!(UserLocation::new(0.0, 24.83).is_some());
        assert!(UserLocation::new(0.0, 0.0).is_none());
        assert!(UserLocation::new(90.5, 0.0).is_none());
        assert!(UserLocation::new(10.0, -180.5).is_none());
        assert!(UserLocation::new(f64::NAN, 1.0).is_none());
    }

    #[test]
    fn test_stored_invalid_location_reads_unset() {
        let mut session = AgentSession::new();
        session
            .set_state_value(
                LocationSlot::STATE_KEY,
                &serde_json::json!({"latitude": 0.0, "longitude": 0.0}),
            )
            .unwrap();
        assert_eq!(LocationSlot::load(&session), LocationSlot::Unset);

        LocationSlot::Unset.store(&mut session).unwrap();
        assert!(session.state.is_empty());
    }

    #[tokio::test]
    async fn test_file_instructions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("orchestrator.md"), "Route.").unwrap();
        let source = FileInstructions::with_root(dir.path());

        let text = source.read_text(Path::new("orchestrator.md")).await.unwrap();
        assert_eq!(text, "Route.");

        let absolute = FileInstructions::new()
            .read_text(&dir.path().join("orchestrator.md"))
            .await
            .unwrap();
        assert_eq!(absolute, "Route.");

        match source.read_text(Path::new("missing.md")).await {
            Err(Error::Instructions { path, message }) => {
                assert!(path.ends_with("missing.md"));
                assert_eq!(message, "file not found");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
