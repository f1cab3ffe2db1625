use std::{collections::BTreeMap, fmt, io, sync::Arc};

/// Keyed error: a stable key, named arguments and a chain of causes.
#[derive(Debug, Clone)]
pub struct SkinError {
    pub key: &'static str,
    pub args: BTreeMap<&'static str, String>,
    pub causes: Vec<SkinCause>,
}

#[derive(Debug, Clone)]
pub enum SkinCause {
    Skin(Box<SkinError>),
    Std(Arc<dyn std::error::Error + Send + Sync>),
}

impl SkinError {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            args: BTreeMap::new(),
            causes: Vec::new(),
        }
    }

    pub fn with_arg(mut self, k: &'static str, v: impl ToString) -> Self {
        self.args.insert(k, v.to_string());
        self
    }

    pub fn push_skin(mut self, cause: SkinError) -> Self {
        self.causes.push(SkinCause::Skin(Box::new(cause)));
        self
    }

    pub fn push_std(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.causes.push(SkinCause::Std(Arc::new(cause)));
        self
    }
}

impl fmt::Display for SkinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.key)?;
        let mut first = true;
        for (k, v) in &self.args {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{k}={v}")?;
        }
        write!(f, ")")?;
        for cause in &self.causes {
            match cause {
                SkinCause::Skin(e) => write!(f, ": {e}")?,
                SkinCause::Std(e) => write!(f, ": {e}")?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for SkinError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.causes.iter().find_map(|c| match c {
            SkinCause::Skin(e) => Some(e.as_ref() as &dyn std::error::Error),
            SkinCause::Std(e) => Some(e.as_ref() as &(dyn std::error::Error + 'static)),
        })
    }
}

impl From<io::Error> for SkinError {
    fn from(err: io::Error) -> Self {
        SkinError::new("io-error").push_std(err)
    }
}

impl From<gltf::Error> for SkinError {
    fn from(err: gltf::Error) -> Self {
        SkinError::new("gltf-error").push_std(err)
    }
}

impl From<wgpu::CreateSurfaceError> for SkinError {
    fn from(err: wgpu::CreateSurfaceError) -> Self {
        SkinError::new("wgpu::CreateSurfaceError").push_std(err)
    }
}

impl From<wgpu::RequestAdapterError> for SkinError {
    fn from(err: wgpu::RequestAdapterError) -> Self {
        SkinError::new("wgpu::RequestAdapterError").push_std(err)
    }
}

impl From<wgpu::RequestDeviceError> for SkinError {
    fn from(err: wgpu::RequestDeviceError) -> Self {
        SkinError::new("wgpu::RequestDeviceError").push_std(err)
    }
}

impl From<winit::error::EventLoopError> for SkinError {
    fn from(err: winit::error::EventLoopError) -> Self {
        SkinError::new("winit::error::EventLoopError").push_std(err)
    }
}

impl From<winit::error::OsError> for SkinError {
    fn from(err: winit::error::OsError) -> Self {
        SkinError::new("winit::error::OsError").push_std(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_args_in_key_order() {
        let err = SkinError::new("too-many-bones")
            .with_arg("max", 128)
            .with_arg("bones", 130);
        assert_eq!(err.to_string(), "too-many-bones(bones=130, max=128)");
    }

    #[test]
    fn display_appends_causes() {
        let inner = SkinError::new("no-skin").with_arg("path", "a.glb");
        let err = SkinError::new("model-load").push_skin(inner);
        assert_eq!(err.to_string(), "model-load(): no-skin(path=a.glb)");
    }

    #[test]
    fn io_error_is_the_source() {
        let err: SkinError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.key, "io-error");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("gone"));
    }
}
