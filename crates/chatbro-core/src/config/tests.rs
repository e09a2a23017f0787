use super::*;

fn domain(key: &str, tool_name: &str) -> DomainSettings {
    DomainSettings {
        key: key.to_string(),
        tool_name: tool_name.to_string(),
        name: None,
        description: format!("{} agent", key),
        context: DomainContextKind::Static,
    }
}

#[test]
fn test_valid_settings() {
    let settings = ChatSettings::new("gpt-4o-mini")
        .with_domain(domain("restaurants", "restaurants_agent"))
        .with_domain(domain("documents", "documents_agent"));

    assert!(settings.validate().is_ok());
    assert_eq!(settings.domains[0].agent_name(), "restaurants");
}

#[test]
fn test_paths() {
    let settings = ChatSettings::new("m").with_contexts_dir("/srv/contexts");

    assert_eq!(
        settings.orchestrator_instructions_path(),
        PathBuf::from("/srv/contexts/orchestrator.md")
    );
    assert_eq!(
        settings.domain_instructions_path("documents"),
        PathBuf::from("/srv/contexts/domains/documents/instructions.md")
    );
    assert_eq!(
        settings.domain_description_path("documents"),
        PathBuf::from("/srv/contexts/domains/documents/description.md")
    );
}

#[test]
fn test_rejects_missing_model() {
    let settings = ChatSettings::new("  ");
    assert!(matches!(settings.validate(), Err(Error::Configuration(_))));
}

#[test]
fn test_rejects_bad_domain_keys() {
    let colon = ChatSettings::new("m").with_domain(domain("a:b", "ab"));
    assert!(colon.validate().is_err());

    let empty = ChatSettings::new("m").with_domain(domain(" ", "x"));
    assert!(empty.validate().is_err());

    let duplicate = ChatSettings::new("m")
        .with_domain(domain("docs", "docs_a"))
        .with_domain(domain("docs", "docs_b"));
    assert!(duplicate.validate().is_err());
}

#[test]
fn test_rejects_bad_tool_names() {
    let spaces = ChatSettings::new("m").with_domain(domain("docs", "search docs"));
    assert!(spaces.validate().is_err());

    let duplicate = ChatSettings::new("m")
        .with_domain(domain("a", "agent"))
        .with_domain(domain("b", "agent"));
    assert!(duplicate.validate().is_err());

    let builtin = ChatSettings::new("m").with_domain(domain("a", "get_current_datetime"));
    assert!(builtin.validate().is_err());
}

#[test]
fn test_rejects_domain_named_like_orchestrator() {
    let settings = ChatSettings::new("m").with_domain(domain("orchestrator", "orchestrator_agent"));
    assert!(matches!(settings.validate(), Err(Error::Configuration(_))));
}

#[test]
fn test_session_ttl_bounds() {
    let mut settings = ChatSettings::new("m");
    assert!(settings.validate().is_ok());

    settings.session.ttl_secs = 0;
    assert!(matches!(settings.validate(), Err(Error::Configuration(_))));

    settings.session.ttl_secs = u64::MAX;
    assert!(matches!(settings.validate(), Err(Error::Configuration(_))));

    settings.session.ttl_secs = MAX_SESSION_TTL_SECS;
    assert!(settings.validate().is_ok());
}

#[test]
fn test_history_thresholds() {
    let mut settings = ChatSettings::new("m");
    settings.history.per_agent.insert("documents".to_string(), 10);

    assert_eq!(settings.history.threshold_for("documents"), 10);
    assert_eq!(settings.history.threshold_for("restaurants"), 40);

    settings.history.per_agent.insert("restaurants".to_string(), 0);
    assert!(settings.validate().is_err());
}

#[test]
fn test_deserialize_from_toml_like_json() {
    let settings: ChatSettings = serde_json::from_value(serde_json::json!({
        "ai_model": "gpt-4o-mini",
        "domains": [
            {
                "key": "restaurants",
                "tool_name": "restaurants_agent",
                "description": "Lunch menus nearby",
                "context": "location"
            }
        ]
    }))
    .unwrap();

    assert_eq!(settings.contexts_dir, PathBuf::from("contexts"));
    assert_eq!(settings.domains[0].context, DomainContextKind::Location);
    assert_eq!(settings.session.ttl_secs, 604_800);
    assert_eq!(settings.max_tool_iterations, 8);
    assert_eq!(settings.orchestrator.name, "OrchestratorAgent");
}
