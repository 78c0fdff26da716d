use crate::dom;

pub fn render() {
    dom::render_into(
        "page",
        r#"<section class="hero">
  <h1>Predict the next great artwork</h1>
  <p class="hero__lead">Artists list their work as NFTs. Collectors stake on the pieces they believe in.
  When the market settles, predictors of the winning artwork share the pool.</p>
  <div class="hero__actions">
    <a class="btn btn--primary" href="/gallery">Start Predicting</a>
    <a class="btn" href="/list">List Your Artwork</a>
  </div>
</section>"#,
    );
}

pub fn render_not_found() {
    dom::render_into(
        "page",
        r#"<section class="hero">
  <h1>Page not found</h1>
  <a class="btn" href="/">Back home</a>
</section>"#,
    );
}
