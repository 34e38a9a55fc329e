/// Where the controller is in its render cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderState {
    /// Nothing rendered yet, or the last refresh had no posts.
    #[default]
    Empty,
    /// A refresh is replacing the main region.
    Rendering,
    /// The main region holds one generation of `posts` articles.
    Rendered { posts: usize },
}
