//! Fixed HTML pages and message bodies.

use html_escape::encode_text;

/// Body of a 404 for a missing resource.
pub const NOT_FOUND_BODY: &str = "Cannot find file<br><a href='/'>Back</a>";

/// Body of a 401 for a group the caller does not hold.
pub const FORBIDDEN_BODY: &str = "Lacking permission<br><a href='/'>Back</a>";

/// Body of a 400 for a path that cannot be mapped under the file root.
pub const BAD_PATH_BODY: &str = "Bad path<br><a href='/'>Back</a>";

/// Body served when a ws-script is requested over plain HTTP.
pub const WS_SCRIPT_BODY: &str = "Cannot read ws script<br><a href='/'>Back</a>";

/// Body served when a script produced nothing or has no handler.
pub const BROKEN_SCRIPT_BODY: &str = "Broken script<br><a href='/'>Back</a>";

/// Placeholder for a directory without visible entries.
pub const EMPTY_LISTING: &str = "There's nothing here!";

/// Body of a 500.
pub fn error_body(message: &str) -> String {
    format!("Error {}<br><a href='/'>Back</a>", encode_text(message))
}

/// Site root: title, login/logout buttons, then the per-group listings.
pub fn index_page(site_name: &str, listings: &str) -> String {
    let name = encode_text(site_name);
    format!(
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>{name}</title></head><body><h1>{name}</h1>
<button onclick="document.cookie='u=; SameSite=strict';document.cookie='p=; SameSite=strict';document.location.reload();">Logout</button>
<button onclick="document.location='/login.html'">Login</button><br><br>
{listings}
</body></html>"#
    )
}

/// Login form. Stores the credentials as cookies client-side; nothing is
/// verified until the next request.
pub fn login_page(site_name: &str) -> String {
    let name = encode_text(site_name);
    format!(
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>{name}</title></head><body><h1>{name}</h1>
<h2>Login:</h2>
<form onsubmit='document.cookie="u="+encodeURIComponent(document.getElementById("u").value)+"; SameSite=strict";document.cookie="p="+encodeURIComponent(document.getElementById("p").value)+"; SameSite=strict";document.location="/";return false;'>
Name:<input id="u" required type="text"><br>
Pass:<input id="p" required type="password"><br>
<input type="submit" value="Go!">
</form>
<p>Note: this page doesn't verify your login credentials are correct</p>
</body></html>"#
    )
}

/// Wraps a single directory listing.
pub fn directory_page(listing: &str) -> String {
    format!(r#"<!DOCTYPE html><head><meta charset="UTF-8"></head>{listing}"#)
}
