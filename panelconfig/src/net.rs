use std::net::UdpSocket;

/// Devine l'adresse IP locale de la machine.
///
/// Un socket UDP est "connecté" vers un serveur DNS public : aucun paquet
/// n'est émis, mais le système choisit l'interface qui servirait à joindre
/// cette adresse. Les contrôleurs du réseau local peuvent ainsi joindre le
/// serveur sans configuration explicite de `host.base_url`.
///
/// Retourne `127.0.0.1` si l'interface ne peut pas être déterminée.
pub fn guess_local_ip() -> String {
    match UdpSocket::bind("0.0.0.0:0") {
        Ok(socket) => {
            if socket.connect("8.8.8.8:80").is_ok() {
                if let Ok(local_addr) = socket.local_addr() {
                    return local_addr.ip().to_string();
                }
            }
            "127.0.0.1".to_string()
        }
        Err(_) => "127.0.0.1".to_string(),
    }
}
