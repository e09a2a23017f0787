
    use super::*;
    use crate::context::MockInstructionsSource;
    use chatbro_llm::{MessageRole, MockProvider, ToolCompletionResponse};
    use chatbro_tools::ToolDefinition;

    struct EchoTool {
        definition: ToolDefinition,
    }

    impl EchoTool {
        fn arc() -> Arc<dyn Tool> {
            Arc::new(Self {
                definition: ToolDefinition::new("echo", "Echoes its input"),
            })
        }
    }

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(&self, input: serde_json::Value) -> chatbro_tools::Result<ToolResult> {
            Ok(ToolResult::success(input, 1))
        }
    }

    fn call(id: &str, name: &str, arguments: &str) -> ToolCall {
        ToolCall::new(id, name, arguments)
    }

    fn agent(llm: &MockProvider) -> Agent {
        let mut source = MockInstructionsSource::new();
        source
            .expect_read_text()
            .returning(|_| Ok("You are a test agent.".to_string()));
        let context = ContextProvider::static_instructions(Arc::new(source), "agent.md");

        Agent::new("restaurants", "RestaurantsAgent", Arc::new(llm.clone()), context)
            .with_model("test-model")
    }

    #[tokio::test]
    async fn test_text_turn_is_recorded() {
        let llm = MockProvider::new();
        llm.add_tool_response(ToolCompletionResponse::text("Hello!"));
        let agent = agent(&llm);
        let mut session = AgentSession::new();

        let text = agent
            .run(&mut session, "Hi", &[], &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(text, "Hello!");
        assert_eq!(
            session.messages,
            vec![Message::user("Hi"), Message::assistant("Hello!")]
        );

        let request = &llm.tool_requests()[0];
        assert_eq!(request.request.model, "test-model");
        assert_eq!(request.request.messages[0].role, MessageRole::System);
        assert_eq!(request.request.messages[1], Message::user("Hi"));
        assert!(request.tools.is_empty());
    }

    #[tokio::test]
    async fn test_history_precedes_new_message() {
        let llm = MockProvider::new();
        let agent = agent(&llm);
        let mut session = AgentSession::new();
        session.messages.push(Message::user("earlier"));
        session.messages.push(Message::assistant("noted"));

        agent
            .run(&mut session, "now", &[], &CancellationToken::new())
            .await
            .unwrap();

        let contents: Vec<String> = llm.tool_requests()[0]
            .request
            .messages
            .iter()
            .map(|m| m.content.clone())
            .collect();
        assert_eq!(contents, vec!["You are a test agent.", "earlier", "noted", "now"]);
        assert_eq!(session.message_count(), 4);
    }

    #[tokio::test]
    async fn test_tool_calls_are_executed_and_fed_back() {
        let llm = MockProvider::new();
        llm.add_tool_response(ToolCompletionResponse::calls(vec![call(
            "c1",
            "echo",
            r#"{"value": 42}"#,
        )]));
        llm.add_tool_response(ToolCompletionResponse::text("Echoed 42"));
        let agent = agent(&llm);
        let mut session = AgentSession::new();

        let text = agent
            .run(&mut session, "echo 42", &[EchoTool::arc()], &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(text, "Echoed 42");
        assert_eq!(session.message_count(), 4);
        assert!(session.messages[1].has_tool_calls());
        assert_eq!(session.messages[2].role, MessageRole::Tool);
        assert_eq!(session.messages[2].tool_call_id.as_deref(), Some("c1"));
        assert_eq!(session.messages[2].content, r#"{"value":42}"#);

        let requests = llm.tool_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].tools[0].name, "echo");
        assert_eq!(requests[1].request.messages.len(), 4);
    }

    #[tokio::test]
    async fn test_tool_failures_are_reported_to_model() {
        let llm = MockProvider::new();
        llm.add_tool_response(ToolCompletionResponse::calls(vec![
            call("c1", "missing_tool", "{}"),
            call("c2", "echo", "not json"),
        ]));
        llm.add_tool_response(ToolCompletionResponse::text("Done"));
        let agent = agent(&llm).with_tools([EchoTool::arc()]);
        let mut session = AgentSession::new();

        agent
            .run(&mut session, "go", &[], &CancellationToken::new())
            .await
            .unwrap();

        assert!(session.messages[2].content.contains("error"));
        assert!(session.messages[2].content.contains("missing_tool"));
        assert_eq!(session.messages[3].content, "{}");
    }

    #[tokio::test]
    async fn test_tool_loop_is_bounded() {
        let llm = MockProvider::new();
        for i in 0..3 {
            llm.add_tool_response(ToolCompletionResponse::calls(vec![call(
                &format!("c{}", i),
                "echo",
                "{}",
            )]));
        }
        let agent = agent(&llm)
            .with_tools([EchoTool::arc()])
            .with_max_tool_iterations(2);
        let mut session = AgentSession::new();

        let result = agent
            .run(&mut session, "loop", &[], &CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(Error::ToolLoopExceeded { iterations: 2, .. })
        ));
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_backend_error_leaves_session_untouched() {
        let llm = MockProvider::new();
        llm.add_tool_error("rate limited");
        let agent = agent(&llm);
        let mut session = AgentSession::new();

        let result = agent
            .run(&mut session, "hi", &[], &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(Error::Llm(_))));
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_turn_does_not_call_model() {
        let llm = MockProvider::new();
        let agent = agent(&llm);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = agent.run(&mut AgentSession::new(), "hi", &[], &cancel).await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(llm.tool_requests().is_empty());
    }

    #[tokio::test]
    async fn test_history_is_reduced_after_turn() {
        let llm = MockProvider::new();
        let agent = agent(&llm).with_reducer(MessageCountingReducer::new(2));
        let mut session = AgentSession::new();
        let cancel = CancellationToken::new();

        agent.run(&mut session, "one", &[], &cancel).await.unwrap();
        agent.run(&mut session, "two", &[], &cancel).await.unwrap();

        assert_eq!(session.message_count(), 2);
        assert_eq!(session.messages[0], Message::user("two"));
    }

    #[test]
    fn test_session_owner_is_agent_key() {
        let agent = agent(&MockProvider::new());
        assert_eq!(agent.owner(), "restaurants");

        let bytes = agent.serialize_session(&AgentSession::new()).unwrap();
        assert!(agent.deserialize_session(&bytes).is_ok());
    }
