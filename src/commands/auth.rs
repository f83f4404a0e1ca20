use std::collections::HashMap;

use anyhow::{Context, Result};
use confsync_core::remote::provider::Provider;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

const DEFAULT_REDIRECT_PORT: u16 = 8085;

pub async fn run(provider_name: &str) -> Result<()> {
    let provider = Provider::from_name(provider_name);
    let port = DEFAULT_REDIRECT_PORT;
    let redirect_uri = format!("http://localhost:{}/callback", port);

    println!("Authenticating with {provider_name}...\n");

    let oauth = provider.auth_init(&redirect_uri).await?;

    println!("Open this URL in your browser to authenticate:\n");
    println!("{}\n", oauth.authorization_url);

    if open::that(&oauth.authorization_url).is_err() {
        println!("(Could not open browser automatically, please copy the URL above)");
    }

    let params = wait_for_callback(port).await?;

    let code = params
        .get("code")
        .ok_or_else(|| anyhow::anyhow!("No code in callback"))?;
    let state = params
        .get("state")
        .ok_or_else(|| anyhow::anyhow!("No state in callback"))?;

    if state != &oauth.state {
        anyhow::bail!("OAuth state mismatch - possible CSRF attack");
    }

    println!("Received authorization code, exchanging for tokens...");

    let account = provider.auth_submit(code, state, &redirect_uri).await?;

    println!("\nAuthenticated as: {}", account);
    println!("\nNow add the remote to your config.toml:");
    println!();
    println!("source = \"~/conferences.csv\"");
    println!();
    println!("[remote]");
    println!("provider = \"{}\"", provider_name);
    println!("{}_account = \"{}\"", provider_name, account);
    println!("{}_calendar_id = \"<calendar id>\"", provider_name);
    println!();
    println!("Use a dedicated calendar: every future event in it that is not in the");
    println!("CSV file will be deleted by `confsync sync`.");
    println!();
    println!("Then run `confsync status` to see what would change.");

    Ok(())
}

/// Accept one redirect on localhost and return its query parameters.
async fn wait_for_callback(port: u16) -> Result<HashMap<String, String>> {
    let address = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&address)
        .await
        .context("Failed to bind OAuth callback listener")?;

    let (stream, _) = listener
        .accept()
        .await
        .context("Failed to accept OAuth callback")?;

    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .await
        .context("Failed to read OAuth callback request line")?;

    let params = parse_callback_request(&request_line)?;

    let response = "HTTP/1.1 200 OK\r\n\
        Content-Type: text/html\r\n\
        Connection: close\r\n\
        \r\n\
        <html><body>\
        <h1>confsync is authorized</h1>\
        <p>You can close this window and return to the terminal.</p>\
        </body></html>";

    let mut stream = reader.into_inner();
    stream
        .write_all(response.as_bytes())
        .await
        .context("Failed to write OAuth callback response")?;
    stream.flush().await?;

    Ok(params)
}

/// `GET /callback?code=..&state=.. HTTP/1.1` → query pairs.
fn parse_callback_request(request_line: &str) -> Result<HashMap<String, String>> {
    let path = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("Invalid HTTP request"))?;

    let url = url::Url::parse(&format!("http://localhost{}", path))?;

    Ok(url.query_pairs().into_owned().collect())
}
