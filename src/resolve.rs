use crate::{
    config::AppSettings,
    descriptor::names,
    error::{ConfigError, Result},
};

/// Expands `{token}` placeholders against one environment's identity.
///
/// Known tokens: `app`, `env`, `account`, `region`, `runtime`, `assets_bucket`,
/// `versions_bucket`, `secret_path`. `{{` and `}}` produce literal braces.
pub struct Resolver<'a> {
    pub app: &'a AppSettings,
    pub env: &'a str,
    pub account: &'a str,
    pub region: &'a str,
    pub runtime: Option<&'a str>,
}

impl<'a> Resolver<'a> {
    pub fn new(app: &'a AppSettings, env: &'a str, account: &'a str, region: &'a str) -> Self {
        Self {
            app,
            env,
            account,
            region,
            runtime: None,
        }
    }

    pub fn with_runtime(mut self, runtime: &'a str) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn resolve(&self, input: &str) -> Result<String> {
        // Fast path
        if !input.contains('{') && !input.contains('}') {
            return Ok(input.to_string());
        }

        let mut out = String::with_capacity(input.len());
        let mut chars = input.char_indices().peekable();

        while let Some((i, ch)) = chars.next() {
            match ch {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    out.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    out.push('}');
                }
                '{' => {
                    let start = i + 1;
                    let Some(len) = input[start..].find('}') else {
                        return Err(ConfigError::UnclosedToken {
                            input: input.to_string(),
                        });
                    };
                    let token = &input[start..start + len];
                    let repl = self
                        .token_value(token)
                        .ok_or_else(|| ConfigError::UnknownToken {
                            token: token.to_string(),
                            input: input.to_string(),
                        })?;
                    out.push_str(&repl);

                    // skip the token body and its closing brace
                    while let Some((j, _)) = chars.next() {
                        if j == start + len {
                            break;
                        }
                    }
                }
                _ => out.push(ch),
            }
        }

        Ok(out)
    }

    fn token_value(&self, token: &str) -> Option<String> {
        let base = &self.app.application_base_name;
        match token.trim() {
            "app" => Some(base.clone()),
            "env" => Some(self.env.to_string()),
            "account" => Some(self.account.to_string()),
            "region" => Some(self.region.to_string()),
            "runtime" => self.runtime.map(str::to_string),
            "assets_bucket" => Some(names::assets_bucket(&self.app.assets_prefix, self.env)),
            "versions_bucket" => Some(names::versions_bucket(base, self.env, self.account)),
            "secret_path" => Some(names::secret_path_prefix(base, self.env)),
            _ => None,
        }
    }
}
