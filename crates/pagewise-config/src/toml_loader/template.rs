//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Pagewise Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[model]
# api_key = ""                           # or set PAGEWISE_API_KEY / OPENAI_API_KEY
# base_url = "https://api.openai.com/v1"
# model = "gpt-4o-mini"
# max_tokens = 1000                      # 1-32768
# temperature = 0.7                      # 0.0-2.0
# tracing_api_key = ""
# tracing_project = "browser-assistant"

[pipeline]
# mode = "graph"          # graph (summarize -> diagram), direct (single call)
# probe_on_setup = false  # send a test message before a session is ready

[session]
# content_budget = 5000        # characters of page text kept (100-100000)
# max_idle_secs = 86400        # idle sessions older than this are removed
# sweep_interval_secs = 300    # 10-86400

[server]
# bind_address = "127.0.0.1"
# port = 19850

[logging]
# level = "INFO"          # TRACE, DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}
