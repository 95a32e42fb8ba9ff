use reqwest::StatusCode;
use rust_decimal::Decimal;

/// Everything that can go wrong talking to the parking API.
///
/// The `Display` text is what the attendant sees; the `Debug` form keeps the
/// underlying reason for the logs.
#[derive(Debug, Fail)]
pub enum ApiError {
    #[fail(display = "Error de conexión. Verifica tu conexión a internet.")]
    Transport(String),
    #[fail(display = "La solicitud tardó demasiado tiempo. Intenta nuevamente.")]
    Timeout,
    #[fail(display = "Error: {}", status)]
    Status { status: StatusCode, body: String },
    #[fail(display = "Respuesta inválida del servidor: {}", _0)]
    Decode(String),
    #[fail(display = "El vehículo {} no está dentro del parqueadero", _0)]
    NotInside(String),
    #[fail(display = "{}", _0)]
    Rejected(String),
    #[fail(display = "Configuración inválida: {}", _0)]
    Config(String),
}

impl ApiError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Business-rule rejections raised by the attendant workflow.
#[derive(Debug, Fail)]
pub enum WorkflowError {
    #[fail(display = "Por favor ingrese una placa")]
    EmptyPlate,
    #[fail(display = "Por favor ingrese usuario y contraseña")]
    EmptyCredentials,
    #[fail(display = "Seleccione una tarifa válida")]
    MissingTariff,
    #[fail(
        display = "El pago ({}) es menor al monto a cobrar ({})",
        paid, due
    )]
    InsufficientPayment { paid: Decimal, due: Decimal },
    #[fail(display = "No se pudo determinar la hora de entrada de {}", _0)]
    UnknownEntryTime(String),
    #[fail(display = "Operación no disponible: {}", _0)]
    InvalidState(&'static str),
    #[fail(display = "{}", _0)]
    Api(#[cause] ApiError),
}

impl From<ApiError> for WorkflowError {
    fn from(err: ApiError) -> WorkflowError {
        WorkflowError::Api(err)
    }
}
