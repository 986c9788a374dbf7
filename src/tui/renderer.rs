use super::error::Result;
use super::scene::Scene;

pub(crate) trait Renderer {
    fn size_hint(&self) -> Result<(u16, u16)>;
    fn render(&mut self, scene: &Scene) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
    /// Give the terminal back to the user after a failure.
    fn recover(&mut self);
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn size_hint(&self) -> Result<(u16, u16)> {
        (**self).size_hint()
    }

    fn render(&mut self, scene: &Scene) -> Result<()> {
        (**self).render(scene)
    }

    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }

    fn recover(&mut self) {
        (**self).recover()
    }
}
